mod access;
mod history;
mod users;
