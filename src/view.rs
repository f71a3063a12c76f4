use std::fmt::{Display, Formatter, Result};

use crate::idea::{Bind, Idea, Label, Layout, List, Operands};

/// The canonical text of an idea. Complete trees read back to the same tree.
impl Display for Idea {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Idea::Number(n) => write!(f, "{n}"),
            Idea::Text(s) => write!(f, "\"{s}\""),
            Idea::Word(s) => write!(f, "{s}"),
            Idea::Label(label) => write!(f, "{label}"),
            Idea::List(list) => write!(f, "({})", Items(list)),
            Idea::Empty => write!(f, "()"),
            Idea::Placeholder => write!(f, "_"),
            Idea::Add(operands) => write_operator(f, self, operands, '+'),
            Idea::Multiply(operands) => write_operator(f, self, operands, '*'),
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:", self.name().unwrap_or("_"))?;
        match self.value() {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "_"),
        }
    }
}

fn write_operator(f: &mut Formatter<'_>, op: &Idea, operands: &Operands, symbol: char) -> Result {
    let (left_power, right_power) = op.powers();
    match operands.left() {
        // equal powers group to the right, so an equally strong left operand
        // is loose too
        Some(left) => {
            let facing = left.right_power();
            write_operand(f, left, binds(facing) && facing <= left_power)?
        }
        None => write!(f, "_")?,
    }
    write!(f, "{symbol}")?;
    match operands.right() {
        Some(right) => {
            let facing = right.left_power();
            write_operand(f, right, binds(facing) && facing < right_power)
        }
        None => write!(f, "_"),
    }
}

fn binds(power: Bind) -> bool {
    power > Bind::NonBinding
}

/// `loose` operands would come apart when read back without parentheses.
fn write_operand(f: &mut Formatter<'_>, operand: &Idea, loose: bool) -> Result {
    if loose || matches!(operand, Idea::Label(_)) {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

struct Items<'a>(&'a List);

impl Display for Items<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (at, item) in self.0.items().iter().enumerate() {
            if at > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// A whole input line: a list shows its items without the outer parentheses.
pub struct LineView<'a>(pub &'a Idea);

impl Display for LineView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.0 {
            Idea::List(list) => write!(f, "{}", Items(list)),
            idea => write!(f, "{idea}"),
        }
    }
}

/// Like [`LineView`], but a list is broken into lines following its
/// [`Layout`].
pub struct LayoutView<'a>(pub &'a Idea);

impl Display for LayoutView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let Idea::List(list) = self.0 else {
            return write!(f, "{}", self.0);
        };
        for (at, item) in list.items().iter().enumerate() {
            if at > 0 {
                let newline = match list.layout() {
                    Layout::Inline => false,
                    Layout::Vertical => true,
                    Layout::BreakAfter(n) => at == n,
                };
                write!(f, "{}", if newline { "\n" } else { " " })?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// One-line summary for an inspector: kind, jam, and what the idea
/// evaluates to.
pub struct Info<'a>(pub &'a Idea);

impl Display for Info<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.0 {
            Idea::Label(label) => write!(f, "Label {}:", label.name().unwrap_or("_"))?,
            Idea::List(list) => write!(f, "List #{}", list.len())?,
            idea => write!(f, "{}", idea.kind())?,
        }
        if let Some(jam) = self.0.jam() {
            write!(f, " !\"{jam}\"")?;
        }
        write!(f, " => {}", self.0.eval())
    }
}
