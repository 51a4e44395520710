//! Canned-response transport for unit tests.

use crate::auth::Session;
use crate::error::{AfstandmetenError, Result};
use crate::http::Transport;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

pub const BROWSE: &str = include_str!("../fixtures/browse.html");
pub const LOGIN_OK: &str = include_str!("../fixtures/login_ok.html");
pub const LOGIN_FAILED: &str = include_str!("../fixtures/login_failed.html");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl Recorded {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

enum Reply {
    Body(Vec<u8>),
    Fail,
}

#[derive(Default)]
struct State {
    requests: Vec<Recorded>,
    replies: VecDeque<Reply>,
}

/// Records every request and answers from a queue. Clones share state, so a
/// test can keep one handle after boxing another into a [`Session`].
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<State>>,
}

impl FakeTransport {
    pub fn push_page(&self, html: &str) {
        self.push_bytes(html.as_bytes());
    }

    pub fn push_bytes(&self, body: &[u8]) {
        self.state
            .borrow_mut()
            .replies
            .push_back(Reply::Body(body.to_vec()));
    }

    pub fn push_error(&self) {
        self.state.borrow_mut().replies.push_back(Reply::Fail);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }

    pub fn last_request(&self) -> Recorded {
        self.state
            .borrow()
            .requests
            .last()
            .cloned()
            .expect("no request was made")
    }

    fn answer(&self, method: &'static str, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.requests.push(Recorded {
            method,
            url: url.to_owned(),
            form: form
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        });
        match state.replies.pop_front() {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail) => Err(AfstandmetenError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
            None => panic!("no canned response for {method} {url}"),
        }
    }
}

impl Transport for FakeTransport {
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let body = self.answer("POST", url, form)?;
        Ok(String::from_utf8(body).expect("fixture pages are UTF-8"))
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.answer("GET", url, &[])
    }
}

/// A session already logged in as the `login_ok.html` user.
pub fn logged_in_session() -> (Session, FakeTransport) {
    let fake = FakeTransport::default();
    fake.push_page(LOGIN_OK);
    let mut session = Session::with_transport(Box::new(fake.clone()), "http://x");
    session.login("jan", "geheim").expect("fixture login succeeds");
    (session, fake)
}
