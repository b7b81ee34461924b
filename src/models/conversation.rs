use serde::{Deserialize, Serialize};

/// Speaker of one conversation turn. Serialized lowercase so the same type
/// doubles as the chat-completion wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn in a session conversation. Ordering defines the model's
/// effective context; the sequence is append-only within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let turn = ConversationTurn::system("rubric");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "rubric");
    }

    #[test]
    fn constructors_set_roles() {
        assert_eq!(ConversationTurn::user("q").role, Role::User);
        assert_eq!(ConversationTurn::assistant("a").role, Role::Assistant);
    }
}
