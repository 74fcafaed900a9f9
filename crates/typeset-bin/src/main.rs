use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use fonts::otf::OtfFont;
use fonts::tfm::TfmFont;
use fonts::FontTable;
use typeset::diag::{Diagnostic, Severity};
use typeset::{Config, FontSet, Job, OutputMode};
use units::Scaled;

/// Typesets a source file to DVI bytes or a JSON layout tree.
#[derive(Debug, Parser)]
#[command(name = "typeset", version = "0.1", about, max_term_width(100))]
struct Cli {
    /// Input source file.
    input: PathBuf,

    /// Output file. Defaults to the input with its extension swapped;
    /// with --mode both, both files are written next to the input.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output encoding.
    #[arg(short, long, value_enum, default_value_t = Mode::Dvi)]
    mode: Mode,

    /// Line width in points.
    #[arg(short, long, default_value_t = 345.0)]
    width: f64,

    /// Directory searched for font files (.tfm, .otf, .ttf).
    #[arg(long, value_name = "DIR")]
    font_dir: Option<PathBuf>,

    /// Fonts to load: text font first, then optionally the math symbol
    /// and extension fonts. Unnamed slots reuse the text font.
    #[arg(long = "font", value_name = "NAME")]
    fonts: Vec<String>,

    /// Compare the produced layout against a reference DVI file and
    /// report per-mark mismatches.
    #[arg(long, value_name = "REFERENCE.dvi")]
    compare: Option<PathBuf>,

    /// Coordinate tolerance for --compare, in sp.
    #[arg(long, default_value_t = layout_json::DEFAULT_TOLERANCE)]
    tolerance: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Mode {
    Dvi,
    Json,
    Both,
}

impl From<Mode> for OutputMode {
    fn from(m: Mode) -> OutputMode {
        match m {
            Mode::Dvi => OutputMode::Dvi,
            Mode::Json => OutputMode::Json,
            Mode::Both => OutputMode::Both,
        }
    }
}

// Exit codes: 1 job errors, 2 comparison mismatch, 3 i/o.
fn main() -> ExitCode {
    env_logger::init();
    match Cli::parse().run() {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::from(3)
        }
    }
}

impl Cli {
    fn run(self) -> Result<ExitCode, String> {
        let source = std::fs::read(&self.input)
            .map_err(|e| format!("cannot read {}: {e}", self.input.display()))?;

        let fonts = self.load_fonts()?;
        let mut arena = arena::Arena::new();
        let cst = texast::cst::parse(&source);
        let ast = match texast::build(&cst, &source, &mut arena) {
            Ok(ast) => ast,
            Err(e) => {
                eprintln!("{} {e}", "error[parse-error]:".red().bold());
                return Ok(ExitCode::from(1));
            }
        };

        let mut config = Config::new(points(self.width));
        config.mode = self.mode.into();
        let outcome = Job {
            config,
            fonts: &fonts,
        }
        .run(&ast, &arena);

        for d in &outcome.diagnostics {
            eprintln!("{}", render(d));
        }

        if let Some(bytes) = &outcome.dvi {
            let path = self.output_path("dvi");
            std::fs::write(&path, bytes)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            println!("wrote {}", path.display());
        }
        if let Some(json) = &outcome.json {
            let path = self.output_path("json");
            std::fs::write(&path, json)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            println!("wrote {}", path.display());
        }

        if let Some(reference) = &self.compare {
            let mismatches = self.run_compare(reference, &outcome, &fonts.table)?;
            if !mismatches.is_empty() {
                for m in &mismatches {
                    eprintln!(
                        "{} event {}: {} {} expected {} actual {} (delta {})",
                        "mismatch:".yellow().bold(),
                        m.index,
                        m.kind,
                        m.field,
                        m.expected,
                        m.actual,
                        m.delta,
                    );
                }
                eprintln!("{} mismatches against {}", mismatches.len(), reference.display());
                return Ok(ExitCode::from(2));
            }
            println!("layout matches {}", reference.display());
        }

        if outcome.has_errors() {
            return Ok(ExitCode::from(1));
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Loads the requested fonts, or `cmr10.tfm` from the font directory
    /// when none are named. Slot order is text, symbol, extension.
    fn load_fonts(&self) -> Result<FontSet, String> {
        let names: Vec<&str> = if self.fonts.is_empty() {
            vec!["cmr10"]
        } else {
            self.fonts.iter().map(String::as_str).collect()
        };
        let mut table = FontTable::new();
        let mut ids = Vec::new();
        for name in &names {
            let path = self.find_font(name)?;
            let font: std::sync::Arc<dyn fonts::FontMetrics> =
                match path.extension().and_then(|e| e.to_str()) {
                    Some("tfm") => std::sync::Arc::new(
                        TfmFont::from_path(&path, None)
                            .map_err(|e| format!("loading {}: {e}", path.display()))?,
                    ),
                    _ => std::sync::Arc::new(
                        OtfFont::from_path(&path, Scaled(10 * 65_536))
                            .map_err(|e| format!("loading {}: {e}", path.display()))?,
                    ),
                };
            log::debug!("loaded font {name} from {}", path.display());
            ids.push(table.add(font));
        }
        let text = ids[0];
        let sym = ids.get(1).copied().unwrap_or(text);
        let ext = ids.get(2).copied().unwrap_or(sym);
        Ok(FontSet {
            table,
            text,
            sym,
            ext,
        })
    }

    /// Resolves a font name against the font directory, trying the known
    /// extensions when the name has none.
    fn find_font(&self, name: &str) -> Result<PathBuf, String> {
        let dir = self.font_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let named = dir.join(name);
        if Path::new(name).extension().is_some() {
            if named.exists() {
                return Ok(named);
            }
        } else {
            for ext in ["tfm", "otf", "ttf"] {
                let candidate = named.with_extension(ext);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }
        Err(format!(
            "font not found: {name} (searched {})",
            dir.display()
        ))
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        match (&self.out, self.mode) {
            // An explicit --out serves one encoding; under --mode both the
            // second file lands next to it with the extension swapped.
            (Some(out), Mode::Both) => out.with_extension(extension),
            (Some(out), _) => out.clone(),
            (None, _) => self.input.with_extension(extension),
        }
    }

    fn run_compare(
        &self,
        reference: &Path,
        outcome: &typeset::Outcome,
        table: &FontTable,
    ) -> Result<Vec<layout_json::Mismatch>, String> {
        let bytes = std::fs::read(reference)
            .map_err(|e| format!("cannot read {}: {e}", reference.display()))?;
        let pages = dvi::read::read_pages(&bytes, table)
            .map_err(|e| format!("cannot parse {}: {e}", reference.display()))?;
        let expected: Vec<layout_json::Event> = pages
            .iter()
            .flat_map(layout_json::dvi_events)
            .collect();
        let actual = layout_json::LayoutNode::from(&outcome.placed).events();
        Ok(layout_json::compare(&expected, &actual, self.tolerance))
    }
}

/// Points to scaled points, rounding to the nearest sp.
fn points(pt: f64) -> Scaled {
    Scaled((pt * 65_536.0).round() as i32)
}

fn render(d: &Diagnostic) -> String {
    let text = d.to_string();
    match d.severity {
        Severity::Note => text.dimmed().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Error => text.red().to_string(),
    }
}
