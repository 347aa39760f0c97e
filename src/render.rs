use sw_sim::{Alphabet, Snapshot};

const GLYPHS: &[u8] = b".#ox+*=%@&";

/// Draw a snapshot as text: one line per `x`, one character per `y`.
///
/// Labels map to glyphs by their position in the alphabet; alphabets larger
/// than the glyph table fall back to `?`.
pub fn render(snapshot: Snapshot<'_>, alphabet: &Alphabet) -> String {
    let mut out = String::with_capacity(snapshot.x_range() * (snapshot.y_range() + 1));
    for row in snapshot.rows() {
        for &label in row {
            let glyph = alphabet
                .position(label)
                .and_then(|p| GLYPHS.get(p))
                .map_or('?', |&b| b as char);
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
