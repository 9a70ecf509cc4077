use std::io;
use std::path::PathBuf;

pub struct CompileCmd {
    pub character: char,
    pub dir: PathBuf,
    pub tolerance: f32,
    pub count: bool,
    pub output: Box<dyn io::Write>,
}

pub struct SelftestCmd {
    pub character: char,
    pub dir: PathBuf,
    pub render: Option<PathBuf>,
    pub output: Box<dyn io::Write>,
}
