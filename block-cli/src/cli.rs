use std::path::PathBuf;

use block::compiler::Prelude;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "Block", bin_name = "block", about)]
pub struct Block {
    /// The Block source file to transpile
    #[structopt(parse(from_os_str), required_unless = "code")]
    pub input: Option<PathBuf>,

    /// Where to write the Python, defaults to the input
    /// path with a `.py` extension
    #[structopt(parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Transpiles inline code and prints the result
    #[structopt(short = "c", long = "code", conflicts_with = "input")]
    pub code: Option<String>,

    /// Runs the transpiler without writing any output
    #[structopt(long)]
    pub check: bool,

    /// Spaces of output per nesting level, overrides the
    /// manifest
    #[structopt(long)]
    pub indent: Option<usize>,

    /// Columns a tab counts for in source indentation,
    /// overrides the manifest
    #[structopt(long)]
    pub tab_width: Option<usize>,

    /// Provides the builtin runtime: `off`, `inline` or
    /// `import`, overrides the manifest
    #[structopt(long)]
    pub prelude: Option<Prelude>,
}
