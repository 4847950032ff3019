/// A 1-based line and 0-based column. Columns count characters, not bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
}

/// Byte offsets of every line start, used to turn spans into positions.
pub struct LineIndex<'s> {
    source_text: &'s str,
    line_starts: Vec<u32>,
}

impl<'s> LineIndex<'s> {
    pub fn new(source_text: &'s str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source_text
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        );
        Self { source_text, line_starts }
    }

    pub fn position(&self, offset: u32) -> Position {
        let idx = self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1);
        let line_start = self.line_starts[idx] as usize;
        let offset = (offset as usize).min(self.source_text.len());
        let column = self.source_text.get(line_start..offset).map_or(0, |s| s.chars().count());
        Position { line: idx as u32 + 1, column: column as u32 }
    }

    pub fn loc(&self, start: u32, end: u32) -> Loc {
        Loc { start: self.position(start), end: self.position(end) }
    }
}
