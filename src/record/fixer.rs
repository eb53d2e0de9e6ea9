/// Restores the delimiter byte that the upstream whole-file partitioner
/// strips from every block.
///
/// The partitioner uses the record delimiter (`>` or `@`) as its split
/// boundary and consumes it, so a block arrives as the record's raw text
/// minus the leading delimiter, usually with a trailing newline from the
/// split point. The fixer strips one trailing newline and reinstates the
/// delimiter; blocks that already start with it (conceptually the first
/// block of the file) pass through unchanged. Empty blocks, such as the
/// split artifact before the file's first delimiter, are dropped.
#[derive(Debug, Clone, Copy)]
pub struct BlockDelimiterFixer {
    delimiter: u8,
}

impl BlockDelimiterFixer {
    #[must_use]
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Fixes one raw block; `None` for empty blocks
    #[must_use]
    pub fn fix_block(&self, block: &str) -> Option<String> {
        if block.is_empty() {
            return None;
        }
        let body = block.strip_suffix('\n').unwrap_or(block);
        if body.is_empty() {
            return None;
        }
        if body.as_bytes()[0] == self.delimiter {
            Some(body.to_string())
        } else {
            let mut fixed = String::with_capacity(body.len() + 1);
            fixed.push(self.delimiter as char);
            fixed.push_str(body);
            Some(fixed)
        }
    }

    /// Adapts a raw block stream into a fixed block stream
    pub fn fix<I>(self, blocks: I) -> impl Iterator<Item = String>
    where
        I: Iterator<Item = String>,
    {
        blocks.filter_map(move |block| self.fix_block(&block))
    }
}
