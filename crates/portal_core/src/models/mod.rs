pub mod attachment;
pub mod department;
pub mod form;
pub mod submission;

pub use attachment::{AttachmentOwner, AttachmentRecord};
pub use department::Department;
pub use form::{FormFields, SubmissionInput, Upload};
pub use submission::{
    AnonymousComplaint, AnonymousComplaintRecord, Complaint, Feedback, SubmissionKind,
};
