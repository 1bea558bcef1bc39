/// 將標題轉為 wiki 的標準空白形式：底線視為空白，連續空白合併
pub fn normalize_title(title: &str) -> String {
    title
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 比對用的標準形式：空白正規化後，標題與命名空間後名稱的首字母大寫
///
/// wiki 預設首字母不分大小寫，`Template:talkpageCountdown` 與
/// `Template:TalkpageCountdown` 指向同一頁。
pub fn canonical_title(title: &str) -> String {
    let normalized = normalize_title(title);
    match normalized.split_once(':') {
        Some((namespace, name)) if !namespace.contains(' ') => {
            format!(
                "{}:{}",
                upper_first(namespace),
                upper_first(name.trim_start())
            )
        }
        _ => upper_first(&normalized),
    }
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// API 在不同欄位使用不同的空白形式（例如 `fromtitle` 用底線），設定檔中的首字母也可能是小寫
pub fn same_title(a: &str, b: &str) -> bool {
    canonical_title(a) == canonical_title(b)
}

/// 去掉 `Template:` 命名空間前綴，得到模板呼叫時使用的名稱
pub fn invocation_name(template_title: &str) -> &str {
    match template_title.split_once(':') {
        Some((namespace, name)) if namespace.trim().eq_ignore_ascii_case("template") => name.trim(),
        _ => template_title.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Talk:Foo_bar"), "Talk:Foo bar");
        assert_eq!(normalize_title("  Talk:Foo__bar "), "Talk:Foo bar");
        assert_eq!(normalize_title("Talk:Foo bar"), "Talk:Foo bar");
    }

    #[test]
    fn test_same_title() {
        assert!(same_title("Wikipedia:Village_pump", "Wikipedia:Village pump"));
        assert!(!same_title("Wikipedia:Village pump", "Wikipedia:Village pump/Archive"));
    }

    #[test]
    fn test_same_title_ignores_first_letter_case() {
        assert!(same_title("Template:talkpageCountdown", "Template:TalkpageCountdown"));
        assert!(same_title("template:talkpage_Countdown", "Template:Talkpage Countdown"));
        assert!(same_title("foo bar", "Foo bar"));
        assert!(!same_title("Template:Talkpagecountdown", "Template:TalkpageCountdown"));
    }

    #[test]
    fn test_canonical_title() {
        assert_eq!(canonical_title("template:talkpageCountdown"), "Template:TalkpageCountdown");
        assert_eq!(canonical_title("Talk: alpha_beta"), "Talk:Alpha beta");
        assert_eq!(canonical_title("élan"), "Élan");
        assert_eq!(canonical_title(""), "");
    }

    #[test]
    fn test_invocation_name() {
        assert_eq!(invocation_name("Template:TalkpageCountdown"), "TalkpageCountdown");
        assert_eq!(invocation_name("template:Frag"), "Frag");
        assert_eq!(invocation_name("TalkpageCountdown"), "TalkpageCountdown");
        assert_eq!(invocation_name("User:Bot/Countdown"), "User:Bot/Countdown");
    }
}
