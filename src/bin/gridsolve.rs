use std::io::{stdin, stdout, Read, Write};

use anyhow::{anyhow, Result};
use clap::Parser;

use gridsolve::adjacency::Tiling;
use gridsolve::interchange::{self, TilingName};
use gridsolve::options::{SatBackendKind, SolveOptions};
use gridsolve::sat::dimacs::DimacsBackend;

#[derive(Parser)]
#[command()]
enum Command {
    /// Read a CSV color grid from stdin, solve it, and print the result.
    ///
    /// Input: one row per line, comma-separated cells; each cell is
    /// either an integer color code, blank, or one of the sentinels -1
    /// (unconstrained), -2 (origin), -3 (far).
    Solve {
        #[arg(long, default_value_t = TilingName(Tiling::Square))]
        tiling: TilingName,

        /// Wall-density floor in [0,1]: at least this fraction of all
        /// edges must end up blocked.
        #[arg(long)]
        wall_density_floor: Option<f64>,

        /// Drive the encoding through the incremental back-end instead of
        /// the batch one. Same CNF, same verdict, different adapter.
        #[arg(long)]
        incremental: bool,

        /// Print the color matrix with Unicode box-drawing walls instead
        /// of ANSI background colors. Easier to copy/paste, harder to
        /// read at a glance.
        #[arg(short, long)]
        box_drawing: bool,

        /// Print the solution as JSON instead of a picture.
        #[arg(long)]
        json: bool,
    },

    /// Read a CSV color grid from stdin and print its CNF encoding as
    /// DIMACS, without invoking the solver. Debug/export only.
    Dimacs {
        #[arg(long, default_value_t = TilingName(Tiling::Square))]
        tiling: TilingName,

        #[arg(long)]
        wall_density_floor: Option<f64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    match Command::parse() {
        Command::Solve { tiling, wall_density_floor, incremental, box_drawing, json } => {
            solve_cmd(tiling.0, wall_density_floor, incremental, box_drawing, json)
        }
        Command::Dimacs { tiling, wall_density_floor } => dimacs_cmd(tiling.0, wall_density_floor),
    }
}

fn read_stdin_grid() -> Result<gridsolve::ColorGrid> {
    let mut buf = String::new();
    stdin().lock().read_to_string(&mut buf)?;
    Ok(interchange::parse_csv(&buf)?)
}

fn solve_cmd(
    tiling: Tiling,
    wall_density_floor: Option<f64>,
    incremental: bool,
    box_drawing: bool,
    json: bool,
) -> Result<()> {
    let grid = read_stdin_grid()?;
    let options = SolveOptions {
        tiling,
        wall_density_floor,
        backend: if incremental { SatBackendKind::Incremental } else { SatBackendKind::Batch },
        ..Default::default()
    };

    let solution = gridsolve::solve(&grid, &options)?.ok_or_else(|| anyhow!("no solution"))?;

    if json {
        println!("{}", interchange::write_json_solution(&solution));
    } else if box_drawing {
        print_box_drawing(&grid, &solution);
    } else {
        color::print_ansi(&solution)?;
    }
    Ok(())
}

fn dimacs_cmd(tiling: Tiling, wall_density_floor: Option<f64>) -> Result<()> {
    let grid = read_stdin_grid()?;
    let options = SolveOptions { tiling, wall_density_floor, ..Default::default() };

    let enc = gridsolve::encoder::encode(&grid, &options, DimacsBackend::new())?
        .ok_or_else(|| anyhow!("instance is infeasible by construction, nothing to encode"))?;

    enc.fb.backend().write_dimacs(&mut stdout().lock())?;
    Ok(())
}

/// One row of box-drawing characters per grid row, doubling the width so
/// vertical walls get their own column — the same trick `voisimage`'s
/// plain `Display` uses for a binary grid, generalized to print `┃`/`━`
/// for blocked edges and spaces for kept ones.
fn print_box_drawing(grid: &gridsolve::ColorGrid, solution: &gridsolve::GridSolution) {
    use std::collections::BTreeSet;
    use gridsolve::Edge;

    let blocked: BTreeSet<Edge> = solution.blocked.iter().copied().collect();
    let (w, h) = (grid.width(), grid.height());
    let mut out = String::new();

    for row in 0..h {
        for col in 0..w {
            let p = gridsolve::Point::new(row, col);
            let color = match solution.colors[row][col] {
                gridsolve::Color::Regular(n) => char::from_digit(n % 10, 10).unwrap_or('?'),
                _ => '?',
            };
            out.push(color);
            if col + 1 < w {
                let wall = blocked.contains(&Edge::new(p, gridsolve::Point::new(row, col + 1)));
                out.push(if wall { '┃' } else { ' ' });
            }
        }
        out.push('\n');
        if row + 1 < h {
            for col in 0..w {
                let p = gridsolve::Point::new(row, col);
                let wall = blocked.contains(&Edge::new(p, gridsolve::Point::new(row + 1, col)));
                out.push(if wall { '━' } else { ' ' });
                if col + 1 < w {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
    }
    print!("{out}");
}

/// ANSI background-color rendering, grounded in `stars.rs`'s `color_fmt`
/// (a fixed 8-entry palette cycled by index rather than a full colorspace —
/// plenty for eyeballing a solved grid at a terminal).
mod color {
    use std::io::Write;

    use termcolor::{BufferWriter, Color as AnsiColor, ColorChoice, ColorSpec, WriteColor};

    use gridsolve::{Color, GridSolution};

    const PALETTE: [AnsiColor; 8] = [
        AnsiColor::Red,
        AnsiColor::Blue,
        AnsiColor::Green,
        AnsiColor::Yellow,
        AnsiColor::Magenta,
        AnsiColor::Cyan,
        AnsiColor::White,
        AnsiColor::Black,
    ];

    pub fn print_ansi(solution: &GridSolution) -> Result<(), std::io::Error> {
        let w = BufferWriter::stdout(ColorChoice::Auto);
        let mut buf = w.buffer();

        for line in solution.colors.lines() {
            for cell in line {
                let mut spec = ColorSpec::new();
                spec.set_bold(true).set_fg(Some(AnsiColor::White));
                if let Color::Regular(n) = cell {
                    spec.set_bg(Some(PALETTE[*n as usize % PALETTE.len()]));
                }
                buf.set_color(&spec)?;
                let digit = match cell {
                    Color::Regular(n) => char::from_digit(n % 10, 10).unwrap_or('?'),
                    _ => '?',
                };
                write!(buf, "{digit}")?;
            }
            buf.reset()?;
            writeln!(buf)?;
        }
        w.print(&buf)
    }
}
