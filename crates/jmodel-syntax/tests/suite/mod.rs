mod declarations;
mod expressions;
mod recovery;
