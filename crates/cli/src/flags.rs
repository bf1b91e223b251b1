use biograph_graph::{ExportFormat, LayoutMode, NodeColorBy, NodeSizeBy};
use clap::ValueEnum;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum FormatFlag {
    Json,
    Gexf,
    Csv,
}

impl FormatFlag {
    pub(crate) const fn as_domain(self) -> ExportFormat {
        match self {
            FormatFlag::Json => ExportFormat::Json,
            FormatFlag::Gexf => ExportFormat::Gexf,
            FormatFlag::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum LayoutModeFlag {
    Force,
    Hierarchical,
}

impl LayoutModeFlag {
    pub(crate) const fn as_domain(self) -> LayoutMode {
        match self {
            LayoutModeFlag::Force => LayoutMode::Force,
            LayoutModeFlag::Hierarchical => LayoutMode::Hierarchical,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum ColorByFlag {
    Type,
    Era,
    Degree,
    Betweenness,
}

impl ColorByFlag {
    pub(crate) const fn as_domain(self) -> NodeColorBy {
        match self {
            ColorByFlag::Type => NodeColorBy::Type,
            ColorByFlag::Era => NodeColorBy::Era,
            ColorByFlag::Degree => NodeColorBy::Degree,
            ColorByFlag::Betweenness => NodeColorBy::Betweenness,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum SizeByFlag {
    Fixed,
    Degree,
    Betweenness,
}

impl SizeByFlag {
    pub(crate) const fn as_domain(self) -> NodeSizeBy {
        match self {
            SizeByFlag::Fixed => NodeSizeBy::Fixed,
            SizeByFlag::Degree => NodeSizeBy::Degree,
            SizeByFlag::Betweenness => NodeSizeBy::Betweenness,
        }
    }
}
