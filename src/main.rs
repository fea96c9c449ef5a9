//! # Textcard CLI
//!
//! Usage:
//!   textcard copy.txt -o card.jpg --template panel-light --background "#F6F7FB"
//!   pbpaste | textcard -o card.png --template minimal
//!   textcard blocks.txt --batch -o products.zip
//!   textcard copy.txt --layout layout.json
//!
//! Fonts are read from `--fonts DIR`, else `$TEXTCARD_FONT_DIR`, else `fonts/`.
//! In `--batch` mode, blocks are separated by lines containing only `---`.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use textcard::batch::{split_blocks, write_zip};
use textcard::config::DEFAULT_FONT_DIR;
use textcard::{CardError, CardRenderer, Template};

struct Args {
    input: Option<String>,
    output: Option<String>,
    template: Template,
    background: Option<String>,
    font_dir: String,
    layout: Option<String>,
    batch: bool,
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn parse_args() -> Result<Args, CardError> {
    let args: Vec<String> = env::args().collect();

    let template = match flag_value(&args, "--template") {
        Some(name) => name.parse()?,
        None => Template::default(),
    };
    let font_dir = flag_value(&args, "--fonts")
        .or_else(|| env::var("TEXTCARD_FONT_DIR").ok())
        .unwrap_or_else(|| DEFAULT_FONT_DIR.to_string());

    Ok(Args {
        input: args.get(1).filter(|a| !a.starts_with('-')).cloned(),
        output: flag_value(&args, "-o"),
        template,
        background: flag_value(&args, "--background"),
        font_dir,
        layout: flag_value(&args, "--layout"),
        batch: args.iter().any(|a| a == "--batch"),
    })
}

fn read_input(path: Option<&str>) -> Result<String, CardError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(args: Args) -> Result<String, CardError> {
    let text = read_input(args.input.as_deref())?;
    let background = args
        .background
        .unwrap_or_else(|| args.template.default_background().to_hex());
    let renderer = CardRenderer::with_font_dir(&args.font_dir);
    let quality = renderer.config().jpeg_quality;

    if args.batch {
        let entries = renderer.render_batch(&split_blocks(&text), args.template, &background)?;
        let zip = write_zip(&entries, quality)?;
        let output = args.output.unwrap_or_else(|| "products.zip".to_string());
        fs::write(&output, &zip)?;
        return Ok(format!(
            "Written {} cards ({} bytes) to {}",
            entries.len(),
            zip.len(),
            output
        ));
    }

    let card = renderer.render(&text, args.template, &background)?;
    if let Some(layout_path) = &args.layout {
        fs::write(layout_path, card.layout().to_json()?)?;
    }
    let output = args
        .output
        .unwrap_or_else(|| "product_description.jpg".to_string());
    card.save(&output, quality)?;
    Ok(format!(
        "Written {}x{} card to {}",
        card.width(),
        card.height(),
        output
    ))
}

fn main() {
    env_logger::init();

    let result = parse_args().and_then(run);
    match result {
        Ok(summary) => eprintln!("✓ {}", summary),
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    }
}
