//! Flat text format for authored collider lines.
//!
//! One polyline per text line, coordinates flattened as `x1,y1,x2,y2,...,`.
//! Values are written with Rust's shortest round-trip float formatting, so a
//! save followed by a load reproduces every coordinate exactly.
//!
//! Decoding never fails. A token that is not a finite number, or an `x`
//! without its `y`, ends that line; a line that ends up with no points is
//! dropped. Blank lines are skipped.

use std::fmt::Write;

use glam::Vec2;

use super::polyline::Polyline;

const SEPARATOR: char = ',';

/// Serialize polylines, one per line, each coordinate followed by a separator.
pub fn encode(lines: &[Polyline]) -> String {
    let mut out = String::new();
    for line in lines {
        for p in line.points() {
            // Writing into a String cannot fail.
            let _ = write!(out, "{}{}{}{}", p.x, SEPARATOR, p.y, SEPARATOR);
        }
        out.push('\n');
    }
    out
}

/// Parse text produced by [`encode`] (or hand-edited files) back into polylines.
pub fn decode(text: &str) -> Vec<Polyline> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(decode_line)
        .collect()
}

fn decode_line(line: &str) -> Option<Polyline> {
    let mut tokens = line.split(SEPARATOR).map(str::trim);
    let mut polyline = Polyline::new();

    while let Some(x) = tokens.next().and_then(parse_coord) {
        let Some(y) = tokens.next().and_then(parse_coord) else {
            break;
        };
        polyline.push(Vec2::new(x, y));
    }

    (!polyline.is_empty()).then_some(polyline)
}

fn parse_coord(token: &str) -> Option<f32> {
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}
