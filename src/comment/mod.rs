mod form;
mod sender;
mod submission;

pub use self::{
    form::{CommentForm, FieldError},
    sender::{CommentSender, HttpCommentSender},
    submission::{CommentSubmission, SubmissionState},
};
