mod demo;

use std::{fs, sync::Arc, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use latebind_engine::{ComponentConfig, Renderable, Scope, component, proxy};
use latebind_types::{ParamMetaMap, Props, Resolution};
use latebind_util::{HttpJsonFetcher, JsonFetcher, RemoteSettings, SettingsOverrides};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("href", sub)) => run_href(sub),
        Some(("render", sub)) => run_render(sub),
        Some(("proxy", sub)) => run_proxy(sub).await,
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn build_cli() -> Command {
    let prop_arg = |name: &'static str| {
        Arg::new(name)
            .long(name)
            .value_name("KEY=VALUE")
            .action(ArgAction::Append)
            .help("Value parsed as JSON when valid, otherwise taken as a string")
    };
    let meta_arg = Arg::new("meta")
        .long("meta")
        .value_name("FILE")
        .action(ArgAction::Set)
        .help("YAML or JSON mapping of parameter name to {default, description}");
    let template_arg = Arg::new("template").required(true).help("RFC 6570 URI template");

    Command::new("latebind")
        .about("Render late-bound components by name, config or remote proxy")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("href")
                .about("Expand a proxy template without fetching")
                .arg(template_arg.clone())
                .arg(prop_arg("param"))
                .arg(meta_arg.clone()),
        )
        .subcommand(
            Command::new("render")
                .about("Render a component config against the demo components")
                .arg(
                    Arg::new("config")
                        .required(true)
                        .help("Component name or JSON config such as '{\"hello\":{\"greeting\":\"Hi\"}}'"),
                )
                .arg(prop_arg("prop")),
        )
        .subcommand(
            Command::new("proxy")
                .about("Fetch a component config from a URI template and render it")
                .arg(template_arg)
                .arg(prop_arg("prop"))
                .arg(meta_arg)
                .arg(
                    Arg::new("base-url")
                        .long("base-url")
                        .value_name("URL")
                        .action(ArgAction::Set)
                        .help("Base URL joined with relative targets"),
                )
                .arg(
                    Arg::new("timeout-secs")
                        .long("timeout-secs")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set)
                        .help("HTTP timeout in seconds"),
                ),
        )
}

fn run_href(matches: &ArgMatches) -> Result<()> {
    let template = required(matches, "template")?;
    let remote = proxy(template, load_param_meta(matches)?).with_context(|| format!("invalid template '{template}'"))?;
    let params = collect_assignments(matches, "param")?;
    println!("{}", remote.href(&params)?);
    Ok(())
}

fn run_render(matches: &ArgMatches) -> Result<()> {
    let raw = required(matches, "config")?;
    let config = match serde_json::from_str::<Value>(raw) {
        Ok(value) => ComponentConfig::try_from(&value)?,
        Err(_) => ComponentConfig::from(raw),
    };
    let dynamic = component(config, None)?;
    debug!(component = %dynamic.name(), "resolved component config");

    let scope = demo_scope()?;
    let props = collect_assignments(matches, "prop")?;
    println!("{}", dynamic.render(&scope, &props)?);
    Ok(())
}

async fn run_proxy(matches: &ArgMatches) -> Result<()> {
    let template = required(matches, "template")?;
    let remote = proxy(template, load_param_meta(matches)?).with_context(|| format!("invalid template '{template}'"))?;
    let props = collect_assignments(matches, "prop")?;

    let overrides = SettingsOverrides {
        base_url: matches.get_one::<String>("base-url").cloned(),
        timeout_secs: matches.get_one::<u64>("timeout-secs").copied(),
    };
    let settings = RemoteSettings::load(&overrides).context("failed to load settings")?;
    let wait = settings.timeout + Duration::from_secs(1);
    let fetcher: Arc<dyn JsonFetcher> = Arc::new(HttpJsonFetcher::new(&settings)?);

    let instance = remote.mount(fetcher)?;
    let scope = demo_scope()?;

    // The first render starts the fetch; the second sees its outcome.
    instance.render(&scope, &props)?;
    info!(url = ?instance.target(), "waiting for proxy resolution");
    tokio::time::timeout(wait, instance.changed())
        .await
        .map_err(|_| anyhow!("no response within {}s", wait.as_secs()))?;

    match instance.resolution() {
        Resolution::Failure(error) => bail!(error),
        Resolution::Pending => bail!("proxy resolution is still pending"),
        Resolution::Success(_) => {}
    }
    println!("{}", instance.render(&scope, &props)?);
    instance.unmount();
    Ok(())
}

fn demo_scope() -> Result<Scope> {
    let scope = Scope::default();
    demo::register(&scope)?;
    Ok(scope)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>"))
}

/// Collects repeated `key=value` flags into props.
fn collect_assignments(matches: &ArgMatches, name: &str) -> Result<Props> {
    let mut props = Props::new();
    for raw in matches.get_many::<String>(name).into_iter().flatten() {
        let (key, value) = parse_assignment(raw)?;
        props.insert(key, value);
    }
    Ok(props)
}

fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn load_param_meta(matches: &ArgMatches) -> Result<Option<ParamMetaMap>> {
    let Some(path) = matches.get_one::<String>("meta") else {
        return Ok(None);
    };
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let params = serde_yaml::from_str(&content).with_context(|| format!("invalid parameter metadata in {path}"))?;
    Ok(Some(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignments_parse_json_then_fall_back_to_strings() {
        assert_eq!(parse_assignment("id=7").unwrap(), ("id".to_string(), json!(7)));
        assert_eq!(parse_assignment("ids=[1,2]").unwrap(), ("ids".to_string(), json!([1, 2])));
        assert_eq!(
            parse_assignment("dataset=admin:orders").unwrap(),
            ("dataset".to_string(), json!("admin:orders"))
        );
        assert_eq!(parse_assignment("empty=").unwrap(), ("empty".to_string(), json!("")));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn href_subcommand_collects_repeated_params() {
        let matches = build_cli()
            .try_get_matches_from(["latebind", "href", "/v/trend.json{?dataset,x}", "--param", "dataset=orders", "--param", "x=[1,2]"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let params = collect_assignments(sub, "param").unwrap();
        let remote = proxy(required(sub, "template").unwrap(), None).unwrap();
        assert_eq!(remote.href(&params).unwrap(), "/v/trend.json?dataset=orders&x=%5B1%2C2%5D");
    }

    #[test]
    fn proxy_subcommand_requires_numeric_timeout() {
        let result = build_cli().try_get_matches_from(["latebind", "proxy", "/api{?id}", "--timeout-secs", "soon"]);
        assert!(result.is_err());
    }
}
