/*!
 * Identifier generation for models persisted without an id.
 *
 * Produces a 36-character hyphenated hex identifier in the 8-4-4-4-12
 * layout. The layout is deliberately not RFC 4122: the version nibble is
 * forced to 4 at the head of the third group, but the variant nibble sits at
 * the third position of the fourth group. Uniqueness is probabilistic;
 * callers key rows on the result and tolerate the (astronomically rare)
 * collision instead of checking for it.
 */

use rand::Rng;

/// Version bits forced on in the third group's leading nibble
const VERSION_VALUE: u16 = 0x4;
/// Version bits kept from the random value (none)
const VERSION_CLEAR: u16 = 0x0;
/// Variant bits forced on in the fourth group's third nibble
const VARIANT_VALUE: u16 = 0x8;
/// Variant bits kept from the random value (low two)
const VARIANT_CLEAR: u16 = 0x3;

/// Generate a fresh identifier.
///
/// Eight random 16-bit groups rendered as four hex digits each, assembled as
/// `g1g2-g3-VERS-vaVAr-g7g8g9` with the version/variant masks applied. No
/// I/O, no shared state.
pub fn generate() -> String {
    let mut rng = rand::rng();
    let mut group = move || rng.random::<u16>();

    // Leading nibble := (random & VERSION_CLEAR) | VERSION_VALUE, always 4.
    let versioned = (group() & ((VERSION_CLEAR << 12) | 0x0fff)) | (VERSION_VALUE << 12);
    // Third nibble := (random & VARIANT_CLEAR) | VARIANT_VALUE, one of 8/9/a/b.
    let varianted = (group() & (0xff0f | (VARIANT_CLEAR << 4))) | (VARIANT_VALUE << 4);

    format!(
        "{:04x}{:04x}-{:04x}-{:04x}-{:04x}-{:04x}{:04x}{:04x}",
        group(),
        group(),
        group(),
        versioned,
        varianted,
        group(),
        group(),
        group()
    )
}
