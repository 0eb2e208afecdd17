use chrono::{DateTime, Utc};
use redb::ReadableTable;

use crate::error::StoreError;
use crate::models::{Message, Response, User};
use crate::tables::{MESSAGES, RESPONSES, USERS};
use crate::{Store, decode, encode, ids};

impl Store {
    // -- Users --

    /// Create the user record if it does not exist yet. Safe to call
    /// repeatedly; an existing record is left untouched.
    pub fn ensure_user(&self, email: &str) -> Result<(), StoreError> {
        self.write(|txn| {
            let mut users = txn.open_table(USERS)?;
            let absent = users.get(email)?.is_none();
            if absent {
                let user = User {
                    email: email.to_string(),
                    message_ids: Vec::new(),
                };
                users.insert(email, encode(&user)?.as_slice())?;
            }
            Ok(())
        })
    }

    pub fn user(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.read(|txn| {
            let users = txn.open_table(USERS)?;
            match users.get(email)? {
                Some(raw) => Ok(Some(decode(raw.value())?)),
                None => Ok(None),
            }
        })
    }

    // -- Messages --

    /// Record a new message for `sender` and materialize its response slots,
    /// all in one transaction.
    ///
    /// The sender's user record must already exist (the login callback calls
    /// `ensure_user`); if it does not, nothing is written, including the
    /// message record buffered before the check.
    pub fn record_message(&self, sender: &str, message: &Message) -> Result<String, StoreError> {
        let id = ids::message_id();
        self.write(|txn| {
            let mut messages = txn.open_table(MESSAGES)?;
            messages.insert(id.as_str(), encode(message)?.as_slice())?;

            let mut users = txn.open_table(USERS)?;
            let mut user: User = match users.get(sender)? {
                Some(raw) => decode(raw.value())?,
                None => return Err(StoreError::UserNotFound(sender.to_string())),
            };
            user.message_ids.push(id.clone());
            users.insert(sender, encode(&user)?.as_slice())?;

            // One unselected slot per option, at recipient index 0. The keys
            // are recomputable from the triple, so outbound links need no
            // lookup table.
            let mut responses = txn.open_table(RESPONSES)?;
            for option in 0..message.options.len() as u32 {
                let key = ids::response_id(&id, 0, option);
                let response = Response {
                    message_id: id.clone(),
                    recipient: 0,
                    option,
                    selected_at: None,
                };
                responses.insert(key.as_str(), encode(&response)?.as_slice())?;
            }
            Ok(())
        })?;
        Ok(id)
    }

    pub fn message(&self, id: &str) -> Result<Option<Message>, StoreError> {
        self.read(|txn| {
            let messages = txn.open_table(MESSAGES)?;
            match messages.get(id)? {
                Some(raw) => Ok(Some(decode(raw.value())?)),
                None => Ok(None),
            }
        })
    }

    /// All messages linked to a user, in the order they were recorded.
    /// An unknown email yields an empty list; the caller decides whether
    /// that is an error.
    pub fn user_messages(&self, email: &str) -> Result<Vec<(String, Message)>, StoreError> {
        self.read(|txn| {
            let users = txn.open_table(USERS)?;
            let user: User = match users.get(email)? {
                Some(raw) => decode(raw.value())?,
                None => return Ok(Vec::new()),
            };

            let messages = txn.open_table(MESSAGES)?;
            let mut out = Vec::with_capacity(user.message_ids.len());
            for id in user.message_ids {
                match messages.get(id.as_str())? {
                    Some(raw) => {
                        let message: Message = decode(raw.value())?;
                        out.push((id, message));
                    }
                    None => return Err(StoreError::MessageNotFound(id)),
                }
            }
            Ok(out)
        })
    }

    // -- Responses --

    /// Record that the recipient selected the response behind `key`.
    ///
    /// First write wins: re-selecting an already-selected response leaves
    /// the original timestamp and returns the stored record unchanged.
    pub fn record_selection(
        &self,
        key: &str,
        at: DateTime<Utc>,
    ) -> Result<Response, StoreError> {
        self.write(|txn| {
            let mut responses = txn.open_table(RESPONSES)?;
            let mut response: Response = match responses.get(key)? {
                Some(raw) => decode(raw.value())?,
                None => return Err(StoreError::ResponseNotFound(key.to_string())),
            };
            if response.selected_at.is_none() {
                response.selected_at = Some(at);
                responses.insert(key, encode(&response)?.as_slice())?;
            }
            Ok(response)
        })
    }

    pub fn response(&self, key: &str) -> Result<Option<Response>, StoreError> {
        self.read(|txn| {
            let responses = txn.open_table(RESPONSES)?;
            match responses.get(key)? {
                Some(raw) => Ok(Some(decode(raw.value())?)),
                None => Ok(None),
            }
        })
    }

    /// The response slots for a message, in option order, fetched by their
    /// recomputed deterministic keys, never by scanning the bucket.
    pub fn message_responses(&self, message_id: &str) -> Result<Vec<Response>, StoreError> {
        self.read(|txn| {
            let messages = txn.open_table(MESSAGES)?;
            let message: Message = match messages.get(message_id)? {
                Some(raw) => decode(raw.value())?,
                None => return Err(StoreError::MessageNotFound(message_id.to_string())),
            };

            let responses = txn.open_table(RESPONSES)?;
            let mut out = Vec::with_capacity(message.options.len());
            for option in 0..message.options.len() as u32 {
                let key = ids::response_id(message_id, 0, option);
                match responses.get(key.as_str())? {
                    Some(raw) => out.push(decode(raw.value())?),
                    None => return Err(StoreError::ResponseNotFound(key)),
                }
            }
            Ok(out)
        })
    }
}
