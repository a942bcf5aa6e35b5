/// The contents of a grammar file.
#[derive(Debug, Default, PartialEq)]
pub struct GrammarDesc {
    pub start: Option<String>,
    pub productions: Vec<ProductionDesc>,
}

/// A `LHS -> sym sym ...` line.
#[derive(Debug, PartialEq)]
pub struct ProductionDesc {
    /// 1-based line number.
    pub line: usize,
    pub left: String,
    pub right: Vec<String>,
}
