use docopt::Docopt;
use labyrinth::{
    generators,
    renderers::{self, OutputFormat, RenderOptionsBuilder},
    units::{Height, Width},
};
use serde_derive::Deserialize;
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "Labyrinth

Generates a perfect maze and renders it to a file.

Usage:
    labyrinth_driver -h | --help
    labyrinth_driver [(--grid-size=<n>|[--grid-width=<w> --grid-height=<h>])] [--format=<fmt>] [--out-dir=<path>] [--name=<base>] [--cell-pixels=<n>] [--seed=<s>] [--print]

Options:
    -h --help          Show this screen.
    --grid-size=<n>    The grid size is n * n.
    --grid-width=<w>   The grid width in a w*h grid [default: 20].
    --grid-height=<h>  The grid height in a w*h grid [default: 20].
    --format=<fmt>     Output format: text, raster or vector [default: vector].
    --out-dir=<path>   Directory the rendered artifact is written into [default: renders].
    --name=<base>      Base file name of the artifact; the extension follows the format [default: maze].
    --cell-pixels=<n>  Pixel count to render one cell wall in a maze [default: 10] max 255.
    --seed=<s>         Seed for the random source, for reproducible mazes.
    --print            Also write the text rendering to stdout.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_format: String,
    flag_out_dir: String,
    flag_name: String,
    flag_cell_pixels: u8,
    flag_seed: Option<u64>,
    flag_print: bool,
}

// We'll put our errors in an `errors` module; `error_chain!` creates the
// Error, ErrorKind, ResultExt and Result types and chains onto the
// library's own error type.
mod errors {
    use error_chain::*;
    error_chain! {
        links {
            Lib(::labyrinth::errors::Error, ::labyrinth::errors::ErrorKind);
        }
        foreign_links {
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    let args: MazeArgs = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let (width, height) = if let Some(square_grid_size) = args.flag_grid_size {
        (square_grid_size, square_grid_size)
    } else {
        (args.flag_grid_width, args.flag_grid_height)
    };

    let format = args.flag_format.parse::<OutputFormat>()?;

    let maze = match args.flag_seed {
        Some(seed) => {
            let mut rng = generators::rng_from_seed(seed);
            generators::generate_with_rng(Width(width), Height(height), &mut rng)?
        }
        None => generators::generate(Width(width), Height(height))?,
    };

    fs::create_dir_all(&args.flag_out_dir)
        .chain_err(|| format!("Failed to create output directory {}", args.flag_out_dir))?;
    let out_path = PathBuf::from(&args.flag_out_dir)
        .join(format!("{}.{}", args.flag_name, format.extension()));

    let render_options = RenderOptionsBuilder::new()
        .format(format)
        .output_file(Some(out_path.as_path()))
        .cell_side_pixels_length(args.flag_cell_pixels)
        .build();
    renderers::render(&maze, &render_options)
        .chain_err(|| format!("Failed to render maze to {}", out_path.display()))?;

    if args.flag_print {
        print!("{}", maze);
    }
    println!("Maze written to {}", out_path.display());

    Ok(())
}
