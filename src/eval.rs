use crate::idea::{Idea, List, Operands};

/// Reduces an idea to its value. Never fails: whatever cannot be computed
/// becomes [`Idea::Placeholder`].
pub fn eval(idea: &Idea) -> Idea {
    match idea {
        Idea::Number(_) | Idea::Text(_) | Idea::Word(_) | Idea::Empty | Idea::Placeholder => {
            idea.clone()
        }
        Idea::List(list) => Idea::List(list.items().iter().map(eval).collect::<List>()),
        Idea::Label(label) => label.value().map_or(Idea::Placeholder, eval),
        Idea::Add(operands) => arithmetic(operands, |left, right| left + right),
        Idea::Multiply(operands) => arithmetic(operands, |left, right| left * right),
    }
}

fn arithmetic(operands: &Operands, apply: impl FnOnce(f64, f64) -> f64) -> Idea {
    let values = [operands.left().map(eval), operands.right().map(eval)];
    match values {
        [Some(Idea::Number(left)), Some(Idea::Number(right))] => Idea::Number(apply(left, right)),
        _ => Idea::Placeholder,
    }
}

impl Idea {
    pub fn eval(&self) -> Idea {
        eval(self)
    }
}
