//! Line/column computation for diagnostics.

/// Start offset of every line, for turning byte offsets into `line:col`.
///
/// Built once per source; each lookup is a binary search over line starts.
///
/// ```
/// use acta_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug)]
pub struct LineOffsetTable {
    /// Always starts with 0.
    line_starts: Vec<usize>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineOffsetTable { line_starts }
    }

    /// Zero-based index of the line containing `offset`.
    fn line_index(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// 1-based `(line, column)` of a byte offset. Columns count characters;
    /// offsets past the end clamp to the end of the source.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let offset = (offset as usize).min(source.len());
        let index = self.line_index(offset);
        let start = self.line_starts[index];
        let column = source.get(start..offset).map_or(0, |text| text.chars().count());
        let to_u32 = |n: usize| u32::try_from(n + 1).unwrap_or(u32::MAX);
        (to_u32(index), to_u32(column))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
