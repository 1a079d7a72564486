//! Fixed five-question wizard.
//!
//! Each role has its own fixed question list; one answer is appended per
//! step and generation requires all five.

use crate::domain::foundation::DomainError;
use crate::domain::profile::Role;

/// Number of questions in every role's wizard list.
pub const WIZARD_QUESTION_COUNT: usize = 5;

const FOUNDER_QUESTIONS: [&str; WIZARD_QUESTION_COUNT] = [
    "你的项目叫什么？一句话介绍它。",
    "你的领域关键词是什么？（如：AI、SaaS、医疗）",
    "现在处于什么阶段？（如：Idea、MVP、已上线）",
    "你现在最需要什么？（如：找技术合伙人、融资）",
    "你能为别人提供什么？（如：技术、渠道、经验）",
];

const INVESTOR_QUESTIONS: [&str; WIZARD_QUESTION_COUNT] = [
    "你的机构或名字是？",
    "你关注哪些赛道？（如：硬科技、出海）",
    "你的投资轮次和范围是多少？",
    "你正在寻找什么样的项目？",
    "你愿意提供哪些支持？（资金、导师、资源）",
];

const EXPLORER_QUESTIONS: [&str; WIZARD_QUESTION_COUNT] = [
    "你的身份是什么？（如：学生、产品经理、媒体）",
    "你感兴趣的创业方向是什么？",
    "你希望在社区认识哪类人？",
    "你能提供什么技能或帮助？",
    "你现在的核心目标是什么？",
];

/// Returns the fixed question list for a role.
pub fn questions_for(role: Role) -> &'static [&'static str; WIZARD_QUESTION_COUNT] {
    match role {
        Role::Founder => &FOUNDER_QUESTIONS,
        Role::Investor => &INVESTOR_QUESTIONS,
        Role::Explorer => &EXPLORER_QUESTIONS,
    }
}

/// Ordered answers to a role's wizard questions.
///
/// Answers are appended one per step. After a failed generation the set is
/// already complete; a further answer then replaces the last one so the
/// member can rephrase before retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardAnswerSet {
    role: Role,
    answers: Vec<String>,
}

impl WizardAnswerSet {
    /// Creates an empty answer set for a role.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            answers: Vec::with_capacity(WIZARD_QUESTION_COUNT),
        }
    }

    /// Returns the role the answers belong to.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the recorded answers in question order.
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Returns the number of recorded answers.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Returns true if no answer has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Returns true once all five answers are recorded.
    pub fn is_complete(&self) -> bool {
        self.answers.len() == WIZARD_QUESTION_COUNT
    }

    /// Records the next answer, or replaces the last one if the set is
    /// already complete.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the answer is empty or whitespace-only
    pub fn record(&mut self, answer: &str) -> Result<(), DomainError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(DomainError::empty_field("answer"));
        }

        if self.is_complete() {
            let last = self.answers.len() - 1;
            self.answers[last] = answer.to_string();
        } else {
            self.answers.push(answer.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_role_has_exactly_five_questions() {
        for role in Role::ALL {
            assert_eq!(questions_for(role).len(), WIZARD_QUESTION_COUNT);
        }
    }

    #[test]
    fn records_answers_in_order() {
        let mut set = WizardAnswerSet::new(Role::Founder);
        set.record("first").unwrap();
        set.record("second").unwrap();
        assert_eq!(set.answers(), &["first", "second"]);
        assert!(!set.is_complete());
    }

    #[test]
    fn completes_after_five_answers() {
        let mut set = WizardAnswerSet::new(Role::Investor);
        for i in 0..WIZARD_QUESTION_COUNT {
            set.record(&format!("answer {i}")).unwrap();
        }
        assert!(set.is_complete());
    }

    #[test]
    fn rejects_empty_answer() {
        let mut set = WizardAnswerSet::new(Role::Explorer);
        assert!(set.record("").is_err());
        assert!(set.record("   \t ").is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn replaces_last_answer_once_complete() {
        let mut set = WizardAnswerSet::new(Role::Founder);
        for i in 0..WIZARD_QUESTION_COUNT {
            set.record(&format!("answer {i}")).unwrap();
        }
        set.record("revised final answer").unwrap();
        assert_eq!(set.len(), WIZARD_QUESTION_COUNT);
        assert_eq!(set.answers()[4], "revised final answer");
        assert_eq!(set.answers()[0], "answer 0");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut set = WizardAnswerSet::new(Role::Founder);
        set.record("  PayFlow  ").unwrap();
        assert_eq!(set.answers()[0], "PayFlow");
    }

    proptest! {
        #[test]
        fn whitespace_only_answers_never_recorded(ws in "[ \t\r\n]{0,16}") {
            let mut set = WizardAnswerSet::new(Role::Founder);
            prop_assert!(set.record(&ws).is_err());
            prop_assert!(set.is_empty());
        }
    }
}
