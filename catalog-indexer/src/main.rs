use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use walkdir::WalkDir;

use blog_filter::{Catalog, CatalogBuilder, QueryState, SortKey};
use utils_common::models::Post;

/// 输出目录中的快照文件名
const CATALOG_FILE: &str = "blog_catalog.bin";

fn cli() -> Command {
    Command::new("catalog-indexer-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("生成博客文章目录快照，并可在命令行中执行筛选")
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .global(true)
            .action(ArgAction::SetTrue))
        .subcommand_required(true)
        .subcommand(Command::new("build")
            .about("从JSON文件构建目录快照")
            .arg(Arg::new("source")
                .short('s')
                .long("source")
                .value_name("SOURCE")
                .help("文章JSON文件或目录")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true))
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("快照输出目录")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true)))
        .subcommand(Command::new("query")
            .about("对快照执行一次筛选")
            .arg(index_arg())
            .arg(Arg::new("search").long("search").value_name("TEXT").help("搜索文本"))
            .arg(Arg::new("category").long("category").value_name("CATEGORY").help("分类").default_value("All"))
            .arg(Arg::new("tag").long("tag").value_name("TAG").help("标签").default_value("All"))
            .arg(Arg::new("sort")
                .long("sort")
                .value_name("SORT")
                .help("排序方式")
                .value_parser(["newest", "oldest", "shortest", "longest"])
                .default_value("newest")))
        .subcommand(Command::new("facets")
            .about("列出快照中的分类、标签和排序方式")
            .arg(index_arg()))
}

fn index_arg() -> Arg {
    Arg::new("index")
        .short('i')
        .long("index")
        .value_name("INDEX_FILE")
        .help("目录快照文件")
        .value_parser(clap::value_parser!(PathBuf))
        .required(true)
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("build", sub)) => {
            let source = required_path(sub, "source")?;
            let output = required_path(sub, "output")?;
            let path = build_catalog(source, output)?;
            println!("{}", path.display());
            Ok(())
        }
        Some(("query", sub)) => {
            let catalog = load_catalog(required_path(sub, "index")?)?;
            let state = state_from_args(sub)?;
            for line in render_results(&catalog, &state) {
                println!("{}", line);
            }
            Ok(())
        }
        Some(("facets", sub)) => {
            let catalog = load_catalog(required_path(sub, "index")?)?;
            println!("categories: {}", catalog.facets().categories.join(", "));
            println!("tags: {}", catalog.facets().tags.join(", "));
            println!("sort: {}", render_sort_options().join(", "));
            Ok(())
        }
        _ => bail!("缺少子命令"),
    }
}

fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    matches
        .get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("缺少参数 --{}", name))
}

/// 扫描JSON文件、校验并写入快照，返回快照路径
fn build_catalog(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let start_time = std::time::Instant::now();

    if !source.exists() {
        bail!("源路径不存在: {}", source.display());
    }

    let posts = scan_post_files(source)?;
    log::info!("扫描完成，找到 {} 篇文章", posts.len());

    let mut builder = CatalogBuilder::new();
    builder.extend(posts);

    let path = output_dir.join(CATALOG_FILE);
    builder
        .save_snapshot(&path)
        .with_context(|| format!("生成目录快照失败: {}", path.display()))?;

    log::info!("目录生成完成！耗时: {:.2}秒", start_time.elapsed().as_secs_f32());
    Ok(path)
}

/// 按路径顺序读取所有 *.json 文件中的文章
fn scan_post_files(source: &Path) -> Result<Vec<Post>> {
    let mut posts = Vec::new();

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.context("遍历目录时出错")?;
        let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
        if !entry.file_type().is_file() || !is_json {
            continue;
        }

        let text = fs::read_to_string(entry.path())
            .with_context(|| format!("无法读取文件 {}", entry.path().display()))?;
        let parsed = parse_post_file(&text)
            .with_context(|| format!("无法解析文章文件 {}", entry.path().display()))?;

        log::debug!("{}: {} 篇文章", entry.path().display(), parsed.len());
        posts.extend(parsed);
    }

    Ok(posts)
}

/// 单个JSON文件可以是一篇文章，也可以是文章数组
fn parse_post_file(text: &str) -> serde_json::Result<Vec<Post>> {
    match serde_json::from_str(text)? {
        array @ Value::Array(_) => serde_json::from_value(array),
        single => serde_json::from_value(single).map(|post| vec![post]),
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let data = fs::read(path).with_context(|| format!("无法读取快照 {}", path.display()))?;
    Catalog::from_snapshot(&data).with_context(|| format!("无法加载快照 {}", path.display()))
}

fn state_from_args(matches: &ArgMatches) -> Result<QueryState> {
    let get = |name: &str| matches.get_one::<String>(name).map(String::as_str);

    let sort: SortKey = get("sort").unwrap_or("newest").parse()?;
    Ok(QueryState::default()
        .with_search(get("search").unwrap_or_default())
        .with_category(get("category").unwrap_or("All"))
        .with_tag(get("tag").unwrap_or("All"))
        .with_sort(sort))
}

// "newest (Newest First)"
fn render_sort_options() -> Vec<String> {
    SortKey::options()
        .iter()
        .map(|option| format!("{} ({})", option.value, option.label))
        .collect()
}

/// 汇总行 + 每篇文章一行
fn render_results(catalog: &Catalog, state: &QueryState) -> Vec<String> {
    let outcome = catalog.run(state);
    let mut lines = vec![outcome.summary()];

    if outcome.is_empty() {
        lines.push("No articles found".to_string());
    }
    lines.extend(outcome.posts.iter().map(|post| {
        format!("{}  {:<12}  {:<32}  {}", post.date, post.read_time, post.slug, post.title)
    }));
    lines
}
