// Create the Error, ErrorKind, ResultExt, and Result types.
// Result is a typedef of std `Result` with the error type our own `Error`.
use error_chain::*;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Image(::image::ImageError);
    }

    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("invalid maze dimensions")
            display("invalid maze dimensions {}x{}: width and height must both be positive",
                    width, height)
        }
        UnsupportedFormat(requested: String) {
            description("unsupported output format")
            display("unsupported output format '{}': expected text, raster or vector", requested)
        }
    }
}
