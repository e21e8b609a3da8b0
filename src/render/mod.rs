mod portable_text;

pub use self::portable_text::{
    Block, BlockKind, Inline, ListKind, MarkDef, Span, TextBlock, render_blocks,
};
