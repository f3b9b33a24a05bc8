use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{ImageBuffer, Rgb};
use itertools::Itertools;

use crate::cells::GridDirection;
use crate::errors::*;
use crate::grid::Grid;
use crate::units::{Height, Width};

/// Output formats understood by `render`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum OutputFormat {
    Text,
    Raster,
    Vector,
}

impl OutputFormat {
    /// File extension for artifacts of this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Raster => "png",
            OutputFormat::Vector => "svg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<OutputFormat> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "raster" => Ok(OutputFormat::Raster),
            "vector" => Ok(OutputFormat::Vector),
            _ => Err(ErrorKind::UnsupportedFormat(s.to_string()).into()),
        }
    }
}

/// Where and how to draw a finished maze.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    format: OutputFormat,
    output_file: Option<PathBuf>,
    cell_side_pixels_length: u8,
}

impl RenderOptions {
    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    #[inline]
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_ref().map(PathBuf::as_path)
    }

    #[inline]
    pub fn cell_side_pixels_length(&self) -> u8 {
        self.cell_side_pixels_length
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptionsBuilder {
    format: OutputFormat,
    output_file: Option<PathBuf>,
    cell_side_pixels_length: u8,
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder {
            format: OutputFormat::Vector,
            output_file: None,
            cell_side_pixels_length: 10,
        }
    }

    pub fn format(mut self, format: OutputFormat) -> RenderOptionsBuilder {
        self.format = format;
        self
    }

    pub fn output_file(mut self, path: Option<&Path>) -> RenderOptionsBuilder {
        self.output_file = path.map(Path::to_path_buf);
        self
    }

    pub fn cell_side_pixels_length(mut self, pixels: u8) -> RenderOptionsBuilder {
        self.cell_side_pixels_length = pixels;
        self
    }

    pub fn build(self) -> RenderOptions {
        RenderOptions {
            format: self.format,
            output_file: self.output_file,
            cell_side_pixels_length: self.cell_side_pixels_length,
        }
    }
}

/// Render a finished maze to the configured destination. The grid is only
/// read, never mutated: rendering failures cannot corrupt the maze.
pub fn render(grid: &Grid, options: &RenderOptions) -> Result<()> {
    match options.format() {
        OutputFormat::Text => render_text(grid, options.output_file()),
        OutputFormat::Raster => render_raster(grid, options),
        OutputFormat::Vector => render_vector(grid, options),
    }
}

/// One axis-aligned wall line in pixel space.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct WallSegment {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

/// Every wall of the grid as a deduplicated segment list: each cell
/// contributes its top and left walls, last-column cells their right wall
/// and last-row cells their bottom wall. Wall-pair symmetry means the
/// shared interior walls are single-sourced.
pub fn wall_segments(grid: &Grid, cell_pixels: u32) -> Vec<WallSegment> {
    let Width(w) = grid.width();
    let Height(h) = grid.height();
    let mut segments = Vec::new();

    for (y, x) in (0..h).cartesian_product(0..w) {
        let cell = &grid.cells()[y * w + x];
        let x0 = x as u32 * cell_pixels;
        let y0 = y as u32 * cell_pixels;
        let x1 = (x as u32 + 1) * cell_pixels;
        let y1 = (y as u32 + 1) * cell_pixels;

        if cell.has_wall(GridDirection::North) {
            segments.push(WallSegment { start: (x0, y0), end: (x1, y0) });
        }
        if cell.has_wall(GridDirection::West) {
            segments.push(WallSegment { start: (x0, y0), end: (x0, y1) });
        }
        if x == w - 1 && cell.has_wall(GridDirection::East) {
            segments.push(WallSegment { start: (x1, y0), end: (x1, y1) });
        }
        if y == h - 1 && cell.has_wall(GridDirection::South) {
            segments.push(WallSegment { start: (x0, y1), end: (x1, y1) });
        }
    }

    segments
}

fn render_text(grid: &Grid, output_file: Option<&Path>) -> Result<()> {
    let rendered = format!("{}", grid);
    match output_file {
        Some(path) => {
            let mut f = File::create(path)?;
            f.write_all(rendered.as_bytes())?;
        }
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn render_raster(grid: &Grid, options: &RenderOptions) -> Result<()> {
    let path = options.output_file()
                      .ok_or("raster rendering requires an output file path")?;
    let cell_pixels = u32::from(options.cell_side_pixels_length());
    let Width(w) = grid.width();
    let Height(h) = grid.height();

    // One extra pixel so the east and south boundary walls are on canvas.
    let img_width = w as u32 * cell_pixels + 1;
    let img_height = h as u32 * cell_pixels + 1;
    let white = Rgb { data: [0xff, 0xff, 0xff] };
    let black = Rgb { data: [0x00, 0x00, 0x00] };
    let mut image_buffer = ImageBuffer::from_pixel(img_width, img_height, white);

    for segment in wall_segments(grid, cell_pixels) {
        let (x0, y0) = segment.start;
        let (x1, y1) = segment.end;
        if y0 == y1 {
            for x in x0..=x1 {
                image_buffer.put_pixel(x, y0, black);
            }
        } else {
            for y in y0..=y1 {
                image_buffer.put_pixel(x0, y, black);
            }
        }
    }

    let mut fout = File::create(path)?;
    image::ImageRgb8(image_buffer)
        .save(&mut fout, image::PNG)
        .chain_err(|| format!("failed to write PNG to {}", path.display()))?;
    Ok(())
}

fn render_vector(grid: &Grid, options: &RenderOptions) -> Result<()> {
    let path = options.output_file()
                      .ok_or("vector rendering requires an output file path")?;
    let cell_pixels = u32::from(options.cell_side_pixels_length());
    let Width(w) = grid.width();
    let Height(h) = grid.height();
    let img_width = w as u32 * cell_pixels + 1;
    let img_height = h as u32 * cell_pixels + 1;

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out,
             r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
             img_width,
             img_height,
             img_width,
             img_height)?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    for segment in wall_segments(grid, cell_pixels) {
        writeln!(out,
                 r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" stroke-width="1" stroke-linecap="square"/>"#,
                 segment.start.0,
                 segment.start.1,
                 segment.end.0,
                 segment.end.1)?;
    }
    writeln!(out, "</svg>")?;
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::GridCoordinate;
    use crate::generators;

    fn seg(x0: u32, y0: u32, x1: u32, y1: u32) -> WallSegment {
        WallSegment {
            start: (x0, y0),
            end: (x1, y1),
        }
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("raster".parse::<OutputFormat>().unwrap(), OutputFormat::Raster);
        assert_eq!("vector".parse::<OutputFormat>().unwrap(), OutputFormat::Vector);
    }

    #[test]
    fn unknown_format_is_unsupported() {
        match "gif".parse::<OutputFormat>() {
            Err(Error(ErrorKind::UnsupportedFormat(ref requested), _)) => {
                assert_eq!(requested, "gif");
            }
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn format_extensions() {
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Raster.extension(), "png");
        assert_eq!(OutputFormat::Vector.extension(), "svg");
    }

    #[test]
    fn builder_defaults() {
        let options = RenderOptionsBuilder::new().build();
        assert_eq!(options.format(), OutputFormat::Vector);
        assert_eq!(options.output_file(), None);
        assert_eq!(options.cell_side_pixels_length(), 10);
    }

    #[test]
    fn fully_walled_2x2_grid_maps_to_the_expected_segments() {
        let g = Grid::new(Width(2), Height(2)).expect("grid failed");

        let expected = vec![seg(0, 0, 10, 0), // (0,0) top
                            seg(0, 0, 0, 10), // (0,0) left
                            seg(10, 0, 20, 0), // (1,0) top
                            seg(10, 0, 10, 10), // (1,0) left
                            seg(20, 0, 20, 10), // (1,0) right
                            seg(0, 10, 10, 10), // (0,1) top
                            seg(0, 10, 0, 20), // (0,1) left
                            seg(0, 20, 10, 20), // (0,1) bottom
                            seg(10, 10, 20, 10), // (1,1) top
                            seg(10, 10, 10, 20), // (1,1) left
                            seg(20, 10, 20, 20), // (1,1) right
                            seg(10, 20, 20, 20)]; // (1,1) bottom
        assert_eq!(wall_segments(&g, 10), expected);
    }

    #[test]
    fn carving_drops_the_matching_segments() {
        let mut g = Grid::new(Width(2), Height(2)).expect("grid failed");
        g.carve_passage(GridCoordinate::new(0, 0), GridCoordinate::new(1, 0))
         .expect("carve failed");
        g.carve_entrance(GridCoordinate::new(0, 0));

        let segments = wall_segments(&g, 10);
        // 12 walls minus the interior pair and the entrance opening.
        assert_eq!(segments.len(), 10);
        // The shared wall between (0,0) and (1,0) is gone from both sides.
        assert!(!segments.contains(&seg(10, 0, 10, 10)));
        // The entrance top wall is gone.
        assert!(!segments.contains(&seg(0, 0, 10, 0)));
    }

    #[test]
    fn generated_maze_segment_count_is_fixed_by_the_tree() {
        // For a w*h perfect maze with two border openings:
        // interior walls:  w*(h-1) + h*(w-1) - (w*h - 1) carved passages
        // boundary walls:  2*w + 2*h - 2 openings
        let (w, h) = (4, 4);
        let mut rng = generators::rng_from_seed(5);
        let maze = generators::generate_with_rng(Width(w), Height(h), &mut rng)
            .expect("generation failed");

        let interior = w * (h - 1) + h * (w - 1) - (w * h - 1);
        let boundary = 2 * w + 2 * h - 2;
        assert_eq!(wall_segments(&maze, 10).len(), interior + boundary);
    }

    #[test]
    fn segment_scaling_follows_cell_pixels() {
        let g = Grid::new(Width(1), Height(1)).expect("grid failed");
        let segments = wall_segments(&g, 25);
        assert_eq!(segments,
                   vec![seg(0, 0, 25, 0),
                        seg(0, 0, 0, 25),
                        seg(25, 0, 25, 25),
                        seg(0, 25, 25, 25)]);
    }
}
