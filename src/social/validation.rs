//! 输入校验

use regex::Regex;
use std::sync::LazyLock;

/// 邮箱本地部分：点分 atom，或带引号的字符串
static EMAIL_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^(?:[-!#$%&'*+/=?^_`{}|~0-9a-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f!\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")$"#,
    )
    .expect("invalid email user pattern")
});

/// 邮箱域名：至少两段；顶级域 2-63 个字符、不以连字符结尾（可以全是数字）
///
/// 标签允许 Unicode 字母和数字，国际化域名经 punycode 编码后同样合法。
static EMAIL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]{0,61}[\p{L}\p{N}])?\.)+[\p{L}\p{N}-]{1,62}[\p{L}\p{N}]$",
    )
    .expect("invalid email domain pattern")
});

/// 域名字面量，例如 `[127.0.0.1]`
static EMAIL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[0-9a-fA-F:.]+\]$").expect("invalid email literal pattern"));

/// 判断输入在语法上是否为合法邮箱地址
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.ends_with('\n') {
        return false;
    }
    let Some((user, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if user.is_empty() || domain.is_empty() || !EMAIL_USER.is_match(user) {
        return false;
    }
    domain.eq_ignore_ascii_case("localhost")
        || EMAIL_DOMAIN.is_match(domain)
        || EMAIL_LITERAL.is_match(domain)
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_valid_email("bob@x.com"));
        assert!(is_valid_email("Bob.Smith+tag@mail.example.org"));
        assert!(is_valid_email("root@localhost"));
        assert!(is_valid_email("a@[127.0.0.1]"));
    }

    #[test]
    fn domain_rules_follow_django_validator() {
        assert!(is_valid_email("bob@münchen.de"));
        assert!(is_valid_email("bob@xn--mnchen-3ya.de"));
        assert!(is_valid_email("bob@host.123"));
        assert!(!is_valid_email("bob@host.c-"));
        assert!(!is_valid_email("bob@-host.com"));
        assert!(!is_valid_email("bob@host..com"));
    }

    #[test]
    fn rejects_names_and_partial_addresses() {
        assert!(!is_valid_email("Bob"));
        assert!(!is_valid_email("bob@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("bob@x"));
        assert!(!is_valid_email("bob smith@x.com"));
        assert!(!is_valid_email("bob@x.c"));
    }
}
