mod answer;
mod correction;
mod player;
mod question;
pub mod simulado;

pub use answer::Answer;
pub use correction::Correction;
pub use player::{QuestionPlayer, SubmitError};
pub(crate) use question::id_from_any;
pub use question::{
    get_question, get_questions, Alternative, ColumnItem, InputSurface, Question, QuestionKind,
};
