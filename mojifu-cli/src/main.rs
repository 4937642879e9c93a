//! MojiFu CLI - capture text styles from one page and re-apply them to another
//!
//! Styles and applied rules live in a store directory (`--store`, default
//! `.mojifu`), one JSON file per key. Set `RUST_LOG=debug` to see what the
//! locator and the store are doing.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mojifu_browser::{CascadeStyleSource, LoadedDocument, Session, load_document};
use mojifu_css::{CompileOptions, StructureTag, TextProperty, query_selector};
use mojifu_dom::{NoGeometry, NodeId};
use mojifu_locator::{get_selector, locate};
use mojifu_store::{
    ApplyOutcome, JsonFileStorage, StyleLibrary, StyleRecord, migrate_saved_styles,
};
use owo_colors::OwoColorize;

/// MojiFu - collect text styles and apply them anywhere
#[derive(Parser, Debug)]
#[command(name = "mojifu")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Find the main article of a page
    mojifu locate page.html

    # Collect the article structure styles of a page
    mojifu capture page.html --url https://blog.example/post

    # Collect the style of one element
    mojifu capture page.html --url https://blog.example/post --element '.lead'

    # Apply a style to the article of another page, site-wide
    mojifu apply 3f2a... other.html --url https://news.example/story

    # Print the stylesheet injected into a page
    mojifu css https://news.example/story
"#)]
struct Cli {
    /// Directory holding saved styles and applied rules
    #[arg(long, global = true, env = "MOJIFU_STORE", default_value = ".mojifu")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the main article of a document
    Locate {
        /// HTML file to inspect
        file: String,
    },

    /// Collect a style from a document
    Capture {
        /// HTML file to capture from
        file: String,

        /// URL the document was loaded from
        #[arg(long)]
        url: String,

        /// Collect the style of this element instead of the article structure
        #[arg(long, value_name = "SELECTOR")]
        element: Option<String>,

        /// Selected text to keep as the sample (defaults to the element's text)
        #[arg(long, requires = "element")]
        text: Option<String>,
    },

    /// Manage saved styles
    Styles {
        #[command(subcommand)]
        action: StylesAction,
    },

    /// Apply a saved style to a document
    ///
    /// Without --element the style goes on the document's article, for every
    /// page of the site. With --element it goes on that element, for the
    /// page's path.
    Apply {
        /// Id of the saved style
        style_id: String,

        /// HTML file to apply to
        file: String,

        /// URL the document was loaded from
        #[arg(long)]
        url: String,

        /// Pick this element instead of the article
        #[arg(long, value_name = "SELECTOR")]
        element: Option<String>,
    },

    /// Manage applied rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Print the stylesheet injected into a page
    Css {
        /// Page URL
        url: String,
    },

    /// Print the CSS of a saved style for a selector
    Compile {
        /// Id of the saved style
        style_id: String,

        /// Selector to apply it to
        selector: String,

        /// Use smart apply (single-element styles only)
        #[arg(long)]
        smart: bool,
    },

    /// Move saved styles over from an older store directory
    Migrate {
        /// The older store directory
        legacy: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum StylesAction {
    /// List saved styles
    List,

    /// Delete a saved style
    Delete {
        /// Id of the style
        id: String,
    },

    /// Enable or disable one property of a saved style
    Toggle {
        /// Id of the style
        id: String,

        /// Property, as `fontSize` or `font-size`
        #[arg(value_parser = parse_property)]
        property: TextProperty,

        /// Element type of an article style (H1..H6, P)
        #[arg(long, value_parser = parse_tag)]
        tag: Option<StructureTag>,

        /// Disable instead of enable
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand, Debug)]
enum RulesAction {
    /// List applied rules, optionally only those matching a page
    List {
        /// Only rules applying to this URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Remove an applied rule
    Remove {
        /// Id of the rule
        id: String,
    },
}

fn parse_property(name: &str) -> Result<TextProperty, String> {
    TextProperty::from_key(name)
        .or_else(|| TextProperty::from_css_name(name))
        .ok_or_else(|| format!("unknown text property '{name}'"))
}

fn parse_tag(name: &str) -> Result<StructureTag, String> {
    StructureTag::from_tag_name(name).ok_or_else(|| format!("unknown element type '{name}'"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    log::debug!("store: {}", cli.store.display());

    let library = StyleLibrary::new(JsonFileStorage::new(&cli.store));
    let mut session = Session::new(library);

    match cli.command {
        Command::Locate { file } => locate_article(&file),
        Command::Capture {
            file,
            url,
            element,
            text,
        } => capture(&mut session, &file, &url, element.as_deref(), text.as_deref()),
        Command::Styles { action } => styles(&mut session, action),
        Command::Apply {
            style_id,
            file,
            url,
            element,
        } => apply(&mut session, &style_id, &file, &url, element.as_deref()),
        Command::Rules { action } => rules(&mut session, action),
        Command::Css { url } => print_css(&session, &url),
        Command::Compile {
            style_id,
            selector,
            smart,
        } => compile(&session, &style_id, &selector, smart),
        Command::Migrate { legacy } => {
            let mut legacy = JsonFileStorage::new(legacy);
            let mut primary = JsonFileStorage::new(&cli.store);
            if migrate_saved_styles(&mut legacy, &mut primary)? {
                println!("{}", "Saved styles migrated.".green());
            } else {
                println!("Nothing to migrate.");
            }
            Ok(())
        }
    }
}

fn load(file: &str) -> Result<LoadedDocument> {
    let doc = load_document(file)?;
    for issue in &doc.parse_issues {
        log::debug!("parse issue: {issue}");
    }
    Ok(doc)
}

fn find_element(doc: &LoadedDocument, selector: &str) -> Result<NodeId> {
    query_selector(&doc.dom, NodeId::ROOT, selector)
        .with_context(|| format!("no element matches '{selector}' in {}", doc.source_path))
}

fn locate_article(file: &str) -> Result<()> {
    let doc = load(file)?;
    let Some(found) = locate(&doc.dom, &NoGeometry) else {
        println!("{}", "No article content found.".yellow());
        return Ok(());
    };
    println!("{}", get_selector(&doc.dom, found.node).bold());
    println!("  tier:  {}", found.tier);
    println!("  score: {}", found.score);
    Ok(())
}

fn print_record(record: &StyleRecord) {
    let kind = if record.is_article() { "article" } else { "single" };
    println!(
        "{}  {}  {}",
        record.id.dimmed(),
        record.name.bold(),
        format!("[{kind}]").cyan()
    );
    println!("    {}", record.sample_text().italic());
}

fn capture(
    session: &mut Session<JsonFileStorage>,
    file: &str,
    url: &str,
    element: Option<&str>,
    text: Option<&str>,
) -> Result<()> {
    let doc = load(file)?;
    let source = CascadeStyleSource::new(&doc.dom);
    let record = if let Some(selector) = element {
        let node = find_element(&doc, selector)?;
        let selected = text.map_or_else(|| doc.dom.text_content(node), str::to_string);
        session.collect_selection(&doc.dom, node, &selected, url, &source)?
    } else {
        session.collect_article(&doc.dom, &NoGeometry, url, &source)?
    };
    println!("{}", "Style collected!".green());
    print_record(&record);
    Ok(())
}

fn styles(session: &mut Session<JsonFileStorage>, action: StylesAction) -> Result<()> {
    let library = session.library_mut();
    match action {
        StylesAction::List => {
            let styles = library.saved_styles()?;
            if styles.is_empty() {
                println!("No saved styles.");
            }
            for style in &styles {
                print_record(style);
            }
        }
        StylesAction::Delete { id } => {
            if !library.delete_style(&id)? {
                bail!("no saved style with id '{id}'");
            }
            println!("{}", "Style deleted.".green());
        }
        StylesAction::Toggle {
            id,
            property,
            tag,
            off,
        } => {
            if !library.set_property_enabled(&id, tag, property, !off)? {
                bail!("style '{id}' has no captured {property} to toggle");
            }
            let state = if off { "disabled" } else { "enabled" };
            println!("{} {state}.", property.css_name().bold());
        }
    }
    Ok(())
}

fn apply(
    session: &mut Session<JsonFileStorage>,
    style_id: &str,
    file: &str,
    url: &str,
    element: Option<&str>,
) -> Result<()> {
    let doc = load(file)?;
    let outcome = if let Some(selector) = element {
        let node = find_element(&doc, selector)?;
        session.enter_picker(style_id)?;
        session.pick(&doc.dom, node, url)?
    } else {
        session.quick_apply(style_id, &doc.dom, &NoGeometry, url)?
    };

    match outcome {
        ApplyOutcome::Applied(rule) => {
            println!("{}", "Style applied!".green());
            println!(
                "{}  {}  on {}",
                rule.id.dimmed(),
                rule.selector.bold(),
                rule.url_pattern
            );
        }
        ApplyOutcome::Duplicate => {
            println!("{}", "Style already applied to this element!".yellow());
        }
    }
    Ok(())
}

fn rules(session: &mut Session<JsonFileStorage>, action: RulesAction) -> Result<()> {
    let library = session.library_mut();
    match action {
        RulesAction::List { url } => {
            let views = match url {
                Some(url) => library.rules_for_url(&url)?,
                None => library.rule_views()?,
            };
            if views.is_empty() {
                println!("No applied rules.");
            }
            for view in views {
                let smart = if view.rule.options.smart_apply { " (smart)" } else { "" };
                println!(
                    "{}  {}  {}{smart}",
                    view.rule.id.dimmed(),
                    view.style_name.bold(),
                    view.rule.selector
                );
                println!("    {}", view.rule.url_pattern.dimmed());
            }
        }
        RulesAction::Remove { id } => {
            if !library.remove_rule(&id)? {
                bail!("no applied rule with id '{id}'");
            }
            println!("{}", "Rule removed.".green());
        }
    }
    Ok(())
}

fn print_css(session: &Session<JsonFileStorage>, url: &str) -> Result<()> {
    let injected = session.applied_stylesheet(url)?;
    for link in &injected.font_links {
        println!("@import url(\"{link}\");");
    }
    if !injected.font_css.is_empty() {
        println!("{}", injected.font_css);
    }
    print!("{}", injected.css);
    Ok(())
}

fn compile(
    session: &Session<JsonFileStorage>,
    style_id: &str,
    selector: &str,
    smart: bool,
) -> Result<()> {
    let Some(style) = session.library().find_style(style_id)? else {
        bail!("no saved style with id '{style_id}'");
    };
    let options = if smart {
        CompileOptions::SMART
    } else {
        CompileOptions::EXACT
    };
    println!("{}", style.compile(selector, options));
    Ok(())
}
