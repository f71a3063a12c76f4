use std::collections::HashMap;
use std::fmt::Display;

use crate::error::Jam;

/// Binding power, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bind {
    NonBinding = 0,
    /// Separates the items of a group.
    Append = 1,
    LabelRight = 2,
    Additive = 3,
    Multiplicative = 4,
    LabelLeft = 5,
}

/// Structural tag of an [`Idea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    Text,
    Word,
    Label,
    List,
    Empty,
    Placeholder,
    Add,
    Multiply,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Number => write!(f, "Number"),
            Kind::Text => write!(f, "Text"),
            Kind::Word => write!(f, "Word"),
            Kind::Label => write!(f, "Label"),
            Kind::List => write!(f, "List"),
            Kind::Empty => write!(f, "Empty"),
            Kind::Placeholder => write!(f, "Placeholder"),
            Kind::Add => write!(f, "Add"),
            Kind::Multiply => write!(f, "Multiply"),
        }
    }
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Idea {
    Number(f64),
    Text(String),
    Word(String),
    Label(Label),
    List(List),
    Empty,
    Placeholder,
    Add(Operands),
    Multiply(Operands),
}

/// Operand slots of a binary operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operands {
    left: Option<Box<Idea>>,
    right: Option<Box<Idea>>,
}

impl Operands {
    pub fn new(left: Idea, right: Idea) -> Self {
        Operands {
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn left(&self) -> Option<&Idea> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Idea> {
        self.right.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Label {
    name: Option<String>,
    value: Option<Box<Idea>>,
    jam: Option<Jam>,
}

impl Label {
    pub fn new(name: impl Into<String>, value: Idea) -> Self {
        Label {
            name: Some(name.into()),
            value: Some(Box::new(value)),
            jam: None,
        }
    }

    /// A label that has its name but no value yet.
    pub fn named(name: impl Into<String>) -> Self {
        Label {
            name: Some(name.into()),
            ..Label::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> Option<&Idea> {
        self.value.as_deref()
    }

    pub fn jam(&self) -> Option<&Jam> {
        self.jam.as_ref()
    }
}

/// How a [`List`] wants to be laid out when shown on its own lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    Inline,
    /// One item per line.
    Vertical,
    /// Break the line after this many items.
    BreakAfter(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    items: Vec<Idea>,
    labels: HashMap<String, usize>,
    layout: Layout,
}

impl List {
    pub fn new() -> Self {
        List::default()
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn items(&self) -> &[Idea] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Looks up a labelled item by its (possibly renamed) name.
    pub fn label(&self, name: &str) -> Option<&Label> {
        match self.labels.get(name).map(|&at| &self.items[at]) {
            Some(Idea::Label(label)) => Some(label),
            _ => None,
        }
    }

    /// Pushes an item. A label whose name is already taken in this list gets
    /// `'` appended until the name is free; the resulting jam is stored on
    /// the label and returned.
    pub fn append(&mut self, mut idea: Idea) -> Option<Jam> {
        let mut jam = None;
        if let Idea::Label(label) = &mut idea {
            if let Some(name) = label.name.clone() {
                let mut renamed = name.clone();
                while self.labels.contains_key(&renamed) {
                    renamed.push('\'');
                }
                if renamed != name {
                    let found = Jam::DuplicateLabel {
                        name,
                        renamed: renamed.clone(),
                    };
                    label.jam = Some(found.clone());
                    label.name = Some(renamed.clone());
                    jam = Some(found);
                }
                self.labels.insert(renamed, self.items.len());
            }
        }
        self.items.push(idea);
        jam
    }

    /// `()` is [`Idea::Empty`], `(x)` is `x`.
    pub fn collapse(mut self) -> Idea {
        match self.items.len() {
            0 => Idea::Empty,
            1 => self.items.remove(0),
            _ => Idea::List(self),
        }
    }
}

impl FromIterator<Idea> for List {
    fn from_iter<T: IntoIterator<Item = Idea>>(iter: T) -> Self {
        let mut list = List::new();
        for idea in iter {
            list.append(idea);
        }
        list
    }
}

impl Idea {
    pub fn add() -> Idea {
        Idea::Add(Operands::default())
    }

    pub fn multiply() -> Idea {
        Idea::Multiply(Operands::default())
    }

    pub fn label() -> Idea {
        Idea::Label(Label::default())
    }

    /// Sets the layout of a list. Other ideas come back unchanged.
    pub fn laid_out(self, layout: Layout) -> Idea {
        match self {
            Idea::List(list) => Idea::List(list.with_layout(layout)),
            idea => idea,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Idea::Number(_) => Kind::Number,
            Idea::Text(_) => Kind::Text,
            Idea::Word(_) => Kind::Word,
            Idea::Label(_) => Kind::Label,
            Idea::List(_) => Kind::List,
            Idea::Empty => Kind::Empty,
            Idea::Placeholder => Kind::Placeholder,
            Idea::Add(_) => Kind::Add,
            Idea::Multiply(_) => Kind::Multiply,
        }
    }

    /// The kind this idea stands for once it is used as an operand: a
    /// complete arithmetic node is a number, a label is whatever it labels.
    pub fn resolves_to(&self) -> Kind {
        match self {
            Idea::Add(operands) | Idea::Multiply(operands) if operands.is_complete() => {
                Kind::Number
            }
            Idea::Label(Label {
                value: Some(value),
                ..
            }) => value.resolves_to(),
            idea => idea.kind(),
        }
    }

    pub fn powers(&self) -> (Bind, Bind) {
        match self {
            Idea::Add(_) => (Bind::Additive, Bind::Additive),
            Idea::Multiply(_) => (Bind::Multiplicative, Bind::Multiplicative),
            Idea::Label(Label {
                value: Some(value),
                ..
            }) => value.powers(),
            Idea::Label(_) => (Bind::LabelLeft, Bind::LabelRight),
            _ => (Bind::NonBinding, Bind::NonBinding),
        }
    }

    pub fn left_power(&self) -> Bind {
        self.powers().0
    }

    pub fn right_power(&self) -> Bind {
        self.powers().1
    }

    /// Operators are the only ideas that may take a left neighbour.
    pub fn is_operator(&self) -> bool {
        matches!(self, Idea::Add(_) | Idea::Multiply(_) | Idea::Label(_))
    }

    /// Add and Multiply with both operands; every other idea is complete.
    pub fn is_complete(&self) -> bool {
        match self {
            Idea::Add(operands) | Idea::Multiply(operands) => operands.is_complete(),
            _ => true,
        }
    }

    pub fn has_open_right(&self) -> bool {
        match self {
            Idea::Add(operands) | Idea::Multiply(operands) => operands.right.is_none(),
            Idea::Label(label) => label.value.is_none(),
            _ => false,
        }
    }

    pub fn jam(&self) -> Option<&Jam> {
        match self {
            Idea::Label(label) => label.jam(),
            _ => None,
        }
    }

    /// Offers `prev` as left operand. On refusal `prev` is handed back.
    pub fn bind_left(&mut self, prev: Idea) -> Result<(), Idea> {
        match self {
            Idea::Add(operands) | Idea::Multiply(operands)
                if operands.left.is_none() && prev.resolves_to() == Kind::Number =>
            {
                operands.left = Some(Box::new(prev));
                Ok(())
            }
            Idea::Label(label) if label.name.is_none() => match prev {
                Idea::Word(name) => {
                    label.name = Some(name);
                    Ok(())
                }
                prev => Err(prev),
            },
            _ => Err(prev),
        }
    }

    /// Offers `next` as right operand. On refusal `next` is handed back.
    pub fn bind_right(&mut self, next: Idea) -> Result<(), Idea> {
        match self {
            Idea::Add(operands) | Idea::Multiply(operands)
                if operands.right.is_none() && next.resolves_to() == Kind::Number =>
            {
                operands.right = Some(Box::new(next));
                Ok(())
            }
            Idea::Label(label) if label.value.is_none() => {
                label.value = Some(Box::new(next));
                Ok(())
            }
            _ => Err(next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(name: &str, value: f64) -> Idea {
        Idea::Label(Label::new(name, Idea::Number(value)))
    }

    #[test]
    fn append_renames_duplicate_labels() {
        let mut list = List::new();
        assert_eq!(list.append(labelled("a", 1.0)), None);
        assert_eq!(
            list.append(labelled("a", 2.0)),
            Some(Jam::DuplicateLabel {
                name: "a".into(),
                renamed: "a'".into()
            })
        );
        list.append(labelled("a", 3.0));

        let names: Vec<_> = list
            .items()
            .iter()
            .map(|idea| match idea {
                Idea::Label(label) => label.name().unwrap_or("_"),
                _ => "?",
            })
            .collect();
        assert_eq!(names, ["a", "a'", "a''"]);
        assert_eq!(list.label("a'").and_then(Label::value), Some(&Idea::Number(2.0)));
        assert!(list.label("a'").and_then(Label::jam).is_some());
        assert!(list.label("a").and_then(Label::jam).is_none());
    }

    #[test]
    fn rename_skips_taken_suffixes() {
        let mut list = List::new();
        list.append(labelled("a'", 1.0));
        list.append(labelled("a", 2.0));
        list.append(labelled("a", 3.0));
        assert_eq!(list.label("a''").and_then(Label::value), Some(&Idea::Number(3.0)));
    }

    #[test]
    fn collapse() {
        assert_eq!(List::new().collapse(), Idea::Empty);

        let single: List = [Idea::Number(42.0)].into_iter().collect();
        assert_eq!(single.collapse(), Idea::Number(42.0));

        let pair: List = [Idea::Number(1.0), Idea::Number(2.0)].into_iter().collect();
        assert!(matches!(pair.collapse(), Idea::List(list) if list.len() == 2));
    }

    #[test]
    fn operators_take_numbers_only() {
        let mut add = Idea::add();
        assert_eq!(
            add.bind_left(Idea::Word("x".into())),
            Err(Idea::Word("x".into()))
        );
        assert_eq!(add.bind_left(Idea::Number(1.0)), Ok(()));
        assert!(!add.is_complete());
        assert_eq!(add.resolves_to(), Kind::Add);

        let mut product = Idea::multiply();
        product.bind_left(Idea::Number(2.0)).unwrap();
        product.bind_right(Idea::Number(3.0)).unwrap();
        assert_eq!(product.resolves_to(), Kind::Number);

        assert_eq!(add.bind_right(product), Ok(()));
        assert!(add.is_complete());
        assert_eq!(add.bind_right(Idea::Number(9.0)), Err(Idea::Number(9.0)));
    }

    #[test]
    fn label_takes_word_name_and_inherits_value() {
        let mut label = Idea::label();
        assert_eq!(label.powers(), (Bind::LabelLeft, Bind::LabelRight));
        assert!(label.bind_left(Idea::Number(1.0)).is_err());
        assert_eq!(label.bind_left(Idea::Word("x".into())), Ok(()));

        let mut sum = Idea::add();
        sum.bind_left(Idea::Number(1.0)).unwrap();
        sum.bind_right(Idea::Number(2.0)).unwrap();
        assert_eq!(label.bind_right(sum), Ok(()));

        assert_eq!(label.kind(), Kind::Label);
        assert_eq!(label.resolves_to(), Kind::Number);
        assert_eq!(label.powers(), (Bind::Additive, Bind::Additive));
        assert!(!label.has_open_right());
    }

    #[test]
    fn laid_out_only_touches_lists() {
        let list: List = [Idea::Number(1.0), Idea::Number(2.0)].into_iter().collect();
        let Idea::List(list) = Idea::List(list).laid_out(Layout::Vertical) else {
            panic!("expected a list");
        };
        assert_eq!(list.layout(), Layout::Vertical);
        assert_eq!(Idea::Empty.laid_out(Layout::BreakAfter(1)), Idea::Empty);
    }
}
