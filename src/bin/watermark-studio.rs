use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use watermark_studio::{
    color, is_supported_image, save_image, Error, FontCatalog, Opacity, PatternMode, Rotation,
    SizeCoefficient, SpacingCoefficient, TileOutcome, ToolKind, Workbench,
};

#[derive(Parser)]
#[command(
    name = "watermark-studio",
    about = "Interactively tile a logo or text watermark across a photo",
    version,
    after_help = "Commands (one per line on stdin):\n  \
                  open <image>        open a new base image\n  \
                  logo <image>        switch to the logo tool and load a logo\n  \
                  text [string|\"\"]    switch to the text tool and set its text\n  \
                  font <name>         select a catalog font (text tool)\n  \
                  fonts               list catalog fonts\n  \
                  color <name|#hex>   set the text color\n  \
                  size|opacity|rotation|spacing-x|spacing-y <n>\n  \
                  pattern single|grid|staggered\n  \
                  show                print the current parameters\n  \
                  reset | save <path> | close | quit\n\n\
                  Every change rewrites the preview image."
)]
struct Cli {
    /// Base image to watermark
    base: Option<PathBuf>,

    /// Directory scanned for .ttf/.otf fonts
    #[arg(short, long, default_value = "Fonts")]
    fonts: PathBuf,

    /// Where the preview of each recomposition is written
    #[arg(short, long, default_value = "preview.png")]
    preview: PathBuf,
}

struct Shell {
    bench: Workbench,
    active: ToolKind,
    preview: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let fonts = if cli.fonts.is_dir() {
        match FontCatalog::scan(&cli.fonts) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: Failed to scan fonts in {}: {e}", cli.fonts.display());
                process::exit(1);
            }
        }
    } else {
        FontCatalog::default()
    };

    let mut shell = Shell {
        bench: Workbench::new(fonts),
        active: ToolKind::Logo,
        preview: cli.preview,
    };

    if let Some(base) = &cli.base {
        shell.run(&format!("open {}", base.display()));
    }

    let stdin = io::stdin();
    prompt();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if !shell.run(line.trim()) {
            break;
        }
        prompt();
    }
}

fn prompt() {
    eprint!("> ");
    let _ = io::stderr().flush();
}

impl Shell {
    /// Execute one command line. Returns `false` when the shell should exit.
    fn run(&mut self, line: &str) -> bool {
        let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        let result = match cmd {
            "" => Ok(false),
            "quit" | "exit" => return false,
            "open" => self.open(arg),
            "logo" => self.logo(arg),
            "text" => self.text(arg),
            "font" => self.font(arg),
            "fonts" => {
                for name in self.bench.fonts().names() {
                    println!("{name}");
                }
                Ok(false)
            }
            "color" => self.color(arg),
            "size" | "opacity" | "rotation" | "spacing-x" | "spacing-y" => self.slider(cmd, arg),
            "pattern" => self.pattern(arg),
            "show" => self.show(),
            "reset" => self.reset(),
            "save" => self.save(arg),
            "close" => {
                if self.bench.close(self.active) {
                    eprintln!("[OK] {} tool closed", self.active);
                }
                Ok(false)
            }
            _ => {
                eprintln!("Unknown command: {cmd}");
                Ok(false)
            }
        };

        match result {
            Ok(true) => self.recompose(),
            Ok(false) => {}
            Err(e) => report(&e),
        }
        true
    }

    fn open(&mut self, arg: &str) -> Result<bool, Error> {
        let image = self.bench.open_base(supported(arg)?)?;
        write_preview(&image, &self.preview);
        Ok(self.bench.is_open(self.active))
    }

    fn logo(&mut self, arg: &str) -> Result<bool, Error> {
        self.active = ToolKind::Logo;
        let tool = self.bench.logo_tool()?;
        if !arg.is_empty() {
            tool.open_logo(supported(arg)?)?;
        }
        Ok(true)
    }

    fn text(&mut self, arg: &str) -> Result<bool, Error> {
        self.active = ToolKind::Text;
        let tool = self.bench.text_tool()?;
        match arg {
            "" => {}
            "\"\"" => tool.set_text(""),
            text => tool.set_text(text),
        }
        Ok(true)
    }

    fn font(&mut self, arg: &str) -> Result<bool, Error> {
        self.active = ToolKind::Text;
        let catalog = self.bench.fonts().clone();
        self.bench.text_tool()?.select_font(&catalog, arg)?;
        Ok(true)
    }

    fn color(&mut self, arg: &str) -> Result<bool, Error> {
        let color = color::resolve(arg)?;
        self.active = ToolKind::Text;
        self.bench.text_tool()?.set_color(color);
        Ok(true)
    }

    fn slider(&mut self, cmd: &str, arg: &str) -> Result<bool, Error> {
        let Ok(value) = arg.parse::<i64>() else {
            eprintln!("Expected a whole number, got '{arg}'");
            return Ok(false);
        };
        let tool = self.bench.tool(self.active)?;
        let mut params = *tool.params();
        match cmd {
            "size" => params.size = SizeCoefficient::new(value)?,
            "opacity" => params.opacity = Opacity::new(value)?,
            "rotation" => params.rotation = Rotation::new(value)?,
            "spacing-x" => params.spacing_x = SpacingCoefficient::new(value)?,
            _ => params.spacing_y = SpacingCoefficient::new(value)?,
        }
        tool.set_params(params);
        Ok(true)
    }

    fn pattern(&mut self, arg: &str) -> Result<bool, Error> {
        let mode: PatternMode = arg.parse()?;
        self.bench.tool(self.active)?.select_pattern(mode);
        Ok(true)
    }

    fn show(&mut self) -> Result<bool, Error> {
        let tool = self.bench.tool(self.active)?;
        let p = tool.params();
        println!(
            "{} tool: size {}, opacity {}, rotation {}, spacing {} / {}, pattern {}",
            self.active,
            p.size,
            p.opacity,
            p.rotation,
            p.spacing_x,
            p.spacing_y,
            p.pattern.map_or_else(|| "none".to_string(), |m| format!("{m:?}")),
        );
        Ok(false)
    }

    fn reset(&mut self) -> Result<bool, Error> {
        let clean = self.bench.reset(self.active)?;
        write_preview(&clean, &self.preview);
        Ok(false)
    }

    fn save(&mut self, arg: &str) -> Result<bool, Error> {
        let written = self.bench.tool(self.active)?.save(Path::new(arg))?;
        eprintln!("[OK] Saved {}", written.display());
        Ok(false)
    }

    fn recompose(&mut self) {
        match self.bench.recompose(self.active) {
            Ok(Some(composition)) => {
                if composition.outcome == TileOutcome::Degenerate {
                    eprintln!("[OK] Nothing to draw (empty mark)");
                }
                write_preview(&composition.image, &self.preview);
            }
            Ok(None) => {}
            Err(e) => report(&e),
        }
    }
}

fn supported(arg: &str) -> Result<&Path, Error> {
    let path = Path::new(arg);
    if is_supported_image(path) {
        Ok(path)
    } else {
        Err(Error::UnsupportedFormat(format!(
            "{arg}: expected a .jpg, .jpeg or .png file"
        )))
    }
}

fn write_preview(image: &image::RgbaImage, path: &Path) {
    if let Err(e) = save_image(image, path) {
        eprintln!("[FAIL] Preview not written: {e}");
    }
}

fn report(err: &Error) {
    match err {
        Error::MissingMark(_) | Error::MissingBaseImage => eprintln!("[WARN] {err}"),
        _ => eprintln!("[FAIL] {err}"),
    }
}
