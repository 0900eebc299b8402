// Application layer - dispatch, edit workflow and session control
pub mod dispatcher;
pub mod session;
pub mod threshold_editor;
