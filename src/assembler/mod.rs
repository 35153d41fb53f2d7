pub mod disasm;
pub mod image;
pub mod model;
pub mod phases;

pub use image::Image;
pub use phases::types::Error;

use crate::spec::types::hw::Byte;

/// Assembles `source` in a single scan, backpatching forward references as
/// their labels are defined. Never fails: undefined labels are recorded in the
/// returned image.
pub fn assemble(source: &str) -> Image {
    let mut prog = phases::Program::default();
    prog.assemble_tokens(phases::tokenize(source));
    let image = prog.finish();

    log::info!(
        "assembled {} word(s), {} undefined label(s)",
        image.words().len(),
        image.undefined_labels().len()
    );
    image
}

/// Assembles raw source text. Bytes which are not valid UTF-8 become U+FFFD,
/// so they can only ever end up inside a comment or a label name.
pub fn assemble_lossy(source: &[Byte]) -> Image {
    assemble(&String::from_utf8_lossy(source))
}

pub fn assemble_bytes(source: &str) -> Vec<Byte> {
    let image = assemble(source);
    image.warn_undefined_labels();
    image.to_bytes()
}
