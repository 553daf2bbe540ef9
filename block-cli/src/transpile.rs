use std::{
    env::current_dir,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use block::{
    common::Source,
    compiler::{
        prelude,
        Config,
        Prelude,
        Syntax,
    },
    transpile_source,
};
use log::debug;

use crate::{
    cli::Block,
    manifest::Manifest,
    status::Status,
    EXTENSION,
};

/// Why a command failed: the source didn't transpile,
/// or something around it went wrong.
#[derive(Debug)]
pub enum Failure {
    Syntax(Syntax),
    Other(String),
}

impl From<Syntax> for Failure {
    fn from(error: Syntax) -> Failure { Failure::Syntax(error) }
}

impl From<String> for Failure {
    fn from(reason: String) -> Failure { Failure::Other(reason) }
}

impl From<&str> for Failure {
    fn from(reason: &str) -> Failure { Failure::Other(reason.to_string()) }
}

/// Reads `block.toml` from `dir` or above, then applies
/// the command line overrides.
fn configure(dir: &Path, options: &Block) -> Result<Config, String> {
    let mut config = match Manifest::find(dir)? {
        Some((manifest, path)) => {
            Status::Info.log(&format!("using {}", path.display()));
            manifest.transpile
        },
        None => Config::default(),
    };

    if let Some(indent) = options.indent {
        config = config.with_indent(indent);
    }
    if let Some(tab_width) = options.tab_width {
        config = config.with_tab_width(tab_width);
    }
    if let Some(prelude) = options.prelude {
        config = config.with_prelude(prelude);
    }

    debug!("configured with {:?}", config);
    Ok(config)
}

fn working_dir() -> Result<PathBuf, String> {
    current_dir().map_err(|_| "Can not determine the working directory".to_string())
}

/// Writes the runtime module next to `output`, unless one
/// is already there.
fn write_runtime(output: &Path) -> Result<(), String> {
    let dir = output.parent().unwrap_or_else(|| Path::new(""));
    let module = dir.join(prelude::MODULE_FILE);
    if module.exists() {
        debug!("keeping existing {}", module.display());
        return Ok(());
    }

    fs::write(&module, prelude::RUNTIME)
        .map_err(|_| format!("Could not write runtime module '{}'", module.display()))?;
    Status::Info.log(&format!("wrote the runtime to {}", module.display()));
    Ok(())
}

pub fn transpile(options: Block) -> Result<(), Failure> {
    if let Some(code) = &options.code {
        let config = configure(&working_dir()?, &options)?;
        let python = transpile_source(Source::source(code), &config)?;

        if options.check {
            Status::Success.log("inline code transpiles");
        } else {
            print!("{}", python);
        }
        return Ok(());
    }

    let input = options.input.clone().ok_or("No input file given")?;
    let source = Source::path(&input)
        .map_err(|_| format!("Could not read source file '{}'", input.display()))?;

    let dir = match fs::canonicalize(&input).ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        Some(dir) => dir,
        None => working_dir()?,
    };
    let config = configure(&dir, &options)?;
    let python = transpile_source(source, &config)?;

    if options.check {
        if options.output.is_some() {
            Status::Warn.log("ignoring the output path, nothing is written with --check");
        }
        Status::Success.log(&format!("{} transpiles", input.display()));
        return Ok(());
    }

    let output = options.output.clone().unwrap_or_else(|| input.with_extension(EXTENSION));
    if output == input {
        return Err(format!("Refusing to overwrite the input file '{}'", input.display()).into());
    }

    fs::write(&output, python)
        .map_err(|_| format!("Could not write output file '{}'", output.display()))?;
    if config.prelude == Prelude::Import {
        write_runtime(&output)?;
    }
    Status::Success.log(&format!(
        "transpiled {} -> {}",
        input.display(),
        output.display()
    ));

    Ok(())
}
