use ammonia;

/// Strips unsafe markup from teacher-authored question text before it is
/// stored. Question text is rendered in both the exam page and the
/// monitoring panel, so a stored `<script>` would run in a teacher's browser.
///
/// Safe formatting tags (like <b>, <p>) survive.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
