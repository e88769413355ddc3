//! Diagnostic dumps of tiles and fragments.
//!
//! Printing is collective: every lane of the plane calls the printer, and only the elected lane
//! writes, so a dump appears once per plane. Dumps are truncated to the rows, columns and
//! precision of the [debug configuration](tilecl_runtime::config::debug::DebugConfig).

use core::fmt::Write;
use tilecl_common::Element;
use tilecl_runtime::{config::debug::DebugConfig, Plane};

use crate::{
    fragment::{FragmentLayout, RegisterFragment},
    tile::SharedLayout,
};

/// Print a tile from every lane of the plane.
pub fn print_tile<S: SharedLayout, W: Write>(
    plane: &Plane,
    tile: &S,
    out: &mut W,
) -> core::fmt::Result {
    for lane in plane.lanes() {
        print_tile_from(plane, lane, tile, out)?;
    }
    Ok(())
}

/// Print a tile as `lane`, which only writes when it is the elected lane.
pub fn print_tile_from<S: SharedLayout, W: Write>(
    plane: &Plane,
    lane: u32,
    tile: &S,
    out: &mut W,
) -> core::fmt::Result {
    if plane.elect() != Some(lane) {
        return Ok(());
    }

    let (row, col) = tile.offset();
    writeln!(
        out,
        "tile {}x{} {} at {:#x} offset ({row}, {col}) swizzle {}B",
        S::ROWS,
        S::COLS,
        S::Elem::TYPE,
        tile.base(),
        tile.swizzle_bytes()
    )?;

    write_matrix(out, &plane.config().debug, S::ROWS, S::COLS, |row, col| tile.get(row, col))
}

/// Print a fragment from every lane of the plane.
pub fn print_fragment<E, const R: usize, const C: usize, L, W>(
    plane: &Plane,
    fragment: &RegisterFragment<E, R, C, L>,
    out: &mut W,
) -> core::fmt::Result
where
    E: Element,
    L: FragmentLayout,
    W: Write,
{
    for lane in plane.lanes() {
        print_fragment_from(plane, lane, fragment, out)?;
    }
    Ok(())
}

/// Print a fragment as `lane`, which only writes when it is the elected lane.
pub fn print_fragment_from<E, const R: usize, const C: usize, L, W>(
    plane: &Plane,
    lane: u32,
    fragment: &RegisterFragment<E, R, C, L>,
    out: &mut W,
) -> core::fmt::Result
where
    E: Element,
    L: FragmentLayout,
    W: Write,
{
    if plane.elect() != Some(lane) {
        return Ok(());
    }

    writeln!(out, "fragment {R}x{C} {} {:?}", E::TYPE, L::LAYOUT)?;
    write_matrix(out, &plane.config().debug, R, C, |row, col| fragment.get(row, col))
}

fn write_matrix<E: Element, W: Write, F: Fn(usize, usize) -> E>(
    out: &mut W,
    config: &DebugConfig,
    rows: usize,
    cols: usize,
    get: F,
) -> core::fmt::Result {
    for row in 0..rows.min(config.max_rows) {
        for col in 0..cols.min(config.max_cols) {
            if col > 0 {
                out.write_char(' ')?;
            }
            match config.precision {
                Some(precision) => write!(out, "{:.precision$}", get(row, col).to_f32())?,
                None => write!(out, "{}", get(row, col))?,
            }
        }
        if cols > config.max_cols {
            out.write_str(" ...")?;
        }
        out.write_char('\n')?;
    }

    if rows > config.max_rows {
        writeln!(out, "... ({} more rows)", rows - config.max_rows)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tilecl_runtime::{config::GlobalConfig, Architecture, DeviceProperties};

    fn plane(debug: DebugConfig) -> Plane {
        let config = GlobalConfig {
            debug,
            ..Default::default()
        };
        Plane::with_config(DeviceProperties::new(Architecture::Ampere), Arc::new(config))
    }

    #[test]
    fn truncates_rows_and_columns() {
        let plane = plane(DebugConfig {
            max_rows: 2,
            max_cols: 3,
            precision: Some(1),
        });
        let fragment = RegisterFragment::<f32, 16, 16>::from_fn(|row, col| (row * 16 + col) as f32);

        let mut out = String::new();
        print_fragment(&plane, &fragment, &mut out).unwrap();

        assert_eq!(
            out,
            "fragment 16x16 f32 RowMajor\n0.0 1.0 2.0 ...\n16.0 17.0 18.0 ...\n... (14 more rows)\n"
        );
    }

    #[test]
    fn only_the_elected_lane_writes() {
        let mut plane = plane(DebugConfig::default());
        plane.set_active_mask(0b1100);
        let fragment = RegisterFragment::<f32, 16, 16>::new();

        let writers: Vec<u32> = plane
            .lanes()
            .filter(|lane| {
                let mut out = String::new();
                print_fragment_from(&plane, *lane, &fragment, &mut out).unwrap();
                !out.is_empty()
            })
            .collect();

        assert_eq!(writers, vec![2]);
    }
}
