//! Helvetica glyph widths and greedy word-wrap for the PDF renderer.
//!
//! Widths are in em units (AFM width / 1000) for the WinAnsi printable ASCII range
//! 0x20..=0x7E. Index = (char as usize) - 32. Everything else falls back to
//! `AVERAGE_CHAR_WIDTH`.

/// Helvetica, from the standard Adobe core-font AFM.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0      1      2      3      4      5      6      7      8      9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {      |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

const AVERAGE_CHAR_WIDTH: f32 = 0.556;
const SPACE_WIDTH: f32 = 0.278;

pub fn char_width(c: char) -> f32 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_CHAR_WIDTH
    }
}

/// Rendered width of a string in em units.
pub fn measure_str(s: &str) -> f32 {
    s.chars().map(char_width).sum()
}

/// Greedy word-wrap of `text` to `max_width_em`.
///
/// Input newlines are preserved as line breaks, blank input lines stay blank, and a
/// single word wider than the line is hard-split by character.
pub fn wrap_lines(text: &str, max_width_em: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in words {
            for piece in split_oversized(word, max_width_em) {
                let piece_w = measure_str(&piece);
                if current.is_empty() {
                    current_width = piece_w;
                    current = piece;
                } else if current_width + SPACE_WIDTH + piece_w > max_width_em {
                    lines.push(std::mem::take(&mut current));
                    current_width = piece_w;
                    current = piece;
                } else {
                    current.push(' ');
                    current.push_str(&piece);
                    current_width += SPACE_WIDTH + piece_w;
                }
            }
        }
        lines.push(current);
    }

    lines
}

fn split_oversized(word: &str, max_width_em: f32) -> Vec<String> {
    if measure_str(word) <= max_width_em {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = char_width(c);
        if !piece.is_empty() && width + w > max_width_em {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
