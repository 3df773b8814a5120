use colored::Colorize;

/// 首页
pub fn render_landing() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Sleep better, starting tonight".bold()));
    out.push_str("Describe what keeps you up at night and get a personalized plan\n");
    out.push_str("from an AI sleep specialist.\n\n");

    for (title, text) in [
        ("AI analysis", "Your description is analyzed for the issues behind poor sleep."),
        ("Practical plan", "Concrete, personalized recommendations you can start today."),
        ("Track progress", "Every analysis is kept so you can follow your sleep score."),
    ] {
        out.push_str(&format!("  {} {}\n", format!("{}:", title).cyan(), text));
    }

    out.push_str(&format!(
        "\n{} {}\n",
        "Get started:".bold(),
        "sonozen auth login".green()
    ));
    out
}
