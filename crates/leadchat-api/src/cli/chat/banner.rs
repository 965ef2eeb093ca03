//! Welcome banner shown before the conversation starts.

use console::style;

use leadchat_types::form::FormDefinition;

/// Print the form's headline, the material on offer, and how to leave.
///
/// In preview mode a notice makes clear that nothing will be recorded.
pub fn print_welcome_banner(form: &FormDefinition, preview: bool) {
    println!();
    println!("  💬 {}", style(&form.title).cyan().bold());
    println!("  {}", style(&form.lead_magnet.title).dim());
    if preview {
        println!();
        println!(
            "  {} {}",
            style("PREVIEW").black().on_yellow().bold(),
            style("No view is counted and no lead is stored.").yellow()
        );
    }
    println!();
    println!("  {}", style("Ctrl+D to leave").dim());
    println!("  {}", style("---").dim());
    println!();
}
