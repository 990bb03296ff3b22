//! # Panorama Viewer
//!
//! Opens a window and pans the panorama camera with the arrow keys.
//!
//! ```text
//! cargo run --bin pano_viewer -- --pan-speed 2 --block-key down
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use clap::Parser;
    use panorama_viewer::input::KeyRef;
    use panorama_viewer::{window, ViewerConfig};

    /// Command line options
    #[derive(Parser, Debug)]
    #[command(name = "pano_viewer")]
    #[command(about = "Look around a panorama with the arrow keys")]
    struct Args {
        /// Window title
        #[arg(long, default_value = "Panorama Viewer")]
        title: String,

        /// Window width
        #[arg(long, default_value_t = 1280)]
        width: u32,

        /// Window height
        #[arg(long, default_value_t = 720)]
        height: u32,

        /// Scale applied to keyboard pans
        #[arg(long, default_value_t = panorama_viewer::scene::DEFAULT_PAN_SPEED)]
        pan_speed: f32,

        /// Grace window after a key release, in milliseconds
        #[arg(long, default_value_t = 300)]
        release_timeout_ms: u64,

        /// Handle keys even when the window is not focused
        #[arg(long)]
        force_focus: bool,

        /// Key to ignore, by name (up, down, left, right) or code. Repeatable.
        #[arg(long = "block-key", value_parser = parse_key)]
        blocked_keys: Vec<u32>,
    }

    fn parse_key(value: &str) -> Result<u32, String> {
        let key = match value.parse::<u32>() {
            Ok(code) => KeyRef::Code(code),
            Err(_) => KeyRef::Name(value),
        };
        key.resolve().map_err(|err| err.to_string())
    }

    impl From<Args> for ViewerConfig {
        fn from(args: Args) -> Self {
            Self {
                title: args.title,
                width: args.width,
                height: args.height,
                pan_speed: args.pan_speed,
                controller_update_timeout: Duration::from_millis(args.release_timeout_ms),
                force_focus: args.force_focus,
                blocked_keys: args.blocked_keys.into_iter().collect(),
            }
        }
    }

    pub fn main() {
        env_logger::init();

        let config = ViewerConfig::from(Args::parse());
        if let Err(err) = window::run(config) {
            log::error!("Viewer failed: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
