/// Flag carrying the feature gate list on every control plane component
pub const FEATURE_GATES_FLAG: &str = "--feature-gates";

/// Find the raw value of the last `--feature-gates` flag in a command line
///
/// The value is everything after the first `=`. A bare `--feature-gates`
/// takes the following argument as its value; any other matching argument
/// without `=` has an empty value. Returns `None` when the flag is absent.
pub fn find_feature_gates<S: AsRef<str>>(args: &[S]) -> Option<&str> {
    let mut found = None;

    for (idx, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        if !arg.contains(FEATURE_GATES_FLAG) {
            continue;
        }

        found = Some(match arg.split_once('=') {
            Some((_, value)) => value,
            None if arg == FEATURE_GATES_FLAG => {
                args.get(idx + 1).map_or("", |next| next.as_ref())
            }
            None => "",
        });
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flag() {
        let args = ["kube-apiserver", "--v=2", "--feature-gates=Foo=true,Bar=false"];
        assert_eq!(find_feature_gates(&args), Some("Foo=true,Bar=false"));
    }

    #[test]
    fn test_missing_flag() {
        let args = ["kube-scheduler", "--v=2"];
        assert_eq!(find_feature_gates(&args), None);

        let empty: [&str; 0] = [];
        assert_eq!(find_feature_gates(&empty), None);
    }

    #[test]
    fn test_last_flag_wins() {
        let args = [
            "--feature-gates=Foo=true",
            "--v=2",
            "--feature-gates=Bar=false",
        ];
        assert_eq!(find_feature_gates(&args), Some("Bar=false"));
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let args = vec!["--feature-gates=A=x=y".to_string()];
        assert_eq!(find_feature_gates(&args), Some("A=x=y"));
    }

    #[test]
    fn test_empty_value_is_still_found() {
        assert_eq!(find_feature_gates(&["--feature-gates="]), Some(""));
    }

    #[test]
    fn test_space_separated_value() {
        let args = ["--feature-gates", "Foo=true", "--v=2"];
        assert_eq!(find_feature_gates(&args), Some("Foo=true"));

        let trailing = ["--v=2", "--feature-gates"];
        assert_eq!(find_feature_gates(&trailing), Some(""));
    }

    #[test]
    fn test_prefixed_flag_does_not_take_next_argument() {
        let args = ["--feature-gates-file", "--v=2"];
        assert_eq!(find_feature_gates(&args), Some(""));

        let args = ["--feature-gates=Foo=true", "--feature-gates-file", "Bar=false"];
        assert_eq!(find_feature_gates(&args), Some(""));
    }
}
