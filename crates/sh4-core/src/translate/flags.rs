use super::Sh4Emitter;

/* sett */
pub fn sett(em: &mut Sh4Emitter) {
    em.set_t();
}

/* clrt */
pub fn clrt(em: &mut Sh4Emitter) {
    em.clear_t();
}

/* sets */
pub fn sets(em: &mut Sh4Emitter) {
    em.set_s();
}

/* clrs */
pub fn clrs(em: &mut Sh4Emitter) {
    em.clear_s();
}

/* nop */
pub fn nop(_em: &mut Sh4Emitter) {}
