use std::io::Write;
use std::path::{Path, PathBuf};

extern crate termcolor;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate simplelog;

extern crate automap;
use automap::errors::{Error, ErrorKind, Result, ResultExt};
use automap::input_buffer::InputBuffer;
use automap::render::{output_path, render_batch, ColorScheme, OutputFormat, RenderConfig, ScaleTally};
use automap::LevelSource;

fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            drop(write_err(err));
            std::process::exit(1);
        }
    }
}

fn write_err(err: Error) -> Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(&mut stderr, "error: ")?;
    stderr.set_color(&ColorSpec::new())?;
    writeln!(&mut stderr, "{}", err)?;
    for cause in err.iter().skip(1) {
        writeln!(&mut stderr, "  caused by: {}", cause)?;
    }
    if let Some(backtrace) = err.backtrace() {
        writeln!(&mut stderr, "{:?}", backtrace)?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = clap_app!(automap =>
        (about: "Draws automap-style pictures of Doom levels")
        (@arg verbose: -v --verbose "Log more, and report the average scale")
        (@arg file: +required "Input WAD file, or - for stdin")
        (@subcommand draw =>
            (about: "Draw levels to image files")
            (@arg pattern: default_value("all") "Levels to draw, e.g. MAP01, E?M4, MAP*, or all")
            (@arg width: -w --width +takes_value default_value("1000") "Image width in pixels")
            (@arg height: -H --height +takes_value default_value("1000") "Image height in pixels")
            (@arg border: -b --border +takes_value default_value("4") "Border on each side, as a percentage of the image")
            (@arg mode: -m --mode +takes_value default_value("edges") "What to draw: edges, vertices, sectors, or nodes")
            (@arg scheme: -s --scheme +takes_value default_value("world") "Color scheme: world or classic")
            (@arg rule: -r --rule +takes_value default_value("action") "Line coloring: heights, action, or combined")
            (@arg polygons: --polygons +takes_value default_value("start-vertices") "Sector polygons: start-vertices or traced")
            (@arg marker: --marker +takes_value default_value("triangle") "Thing markers: triangle or circle")
            (@arg format: -f --format +takes_value default_value("png") "Output format: png, bmp, jpeg, or svg")
            (@arg outdir: -o --outdir +takes_value default_value(".") "Directory to write images into")
            (@arg max_scale: --scale +takes_value "Never draw more than this many pixels per level unit")
            (@arg things: --things "Mark things")
            (@arg axis: --axis "Draw the level's x and y axes")
            (@arg legend: --legend "Draw a scale legend")
            (@arg thin: --thin "Draw lines one pixel wide")
        )
        (@subcommand list =>
            (about: "List the levels in a WAD")
        )
        (@subcommand info =>
            (about: "List the lumps in a WAD")
        )
    ).get_matches();

    let level = if args.is_present("verbose") { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::default().set_time_level(log::LevelFilter::Off).build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ).chain_err(|| "couldn't set up logging")?;

    let filename = args.value_of("file").unwrap_or("-");
    let input = InputBuffer::open(filename)?;
    let wad = automap::parse_wad(input.bytes())
        .chain_err(|| format!("couldn't parse {}", filename))?;
    debug!("{} is a {:?} with {} lumps", filename, wad.header.identification, wad.header.numlumps);

    match args.subcommand() {
        ("draw", Some(subargs)) => { do_draw(&args, subargs, filename, &wad)? },
        ("list", Some(_)) => { do_list(&wad) },
        ("info", Some(_)) => { do_info(&wad) },
        _ => {
            println!("{}", args.usage());
        }
    }

    Ok(())
}

fn parse_arg<T>(subargs: &clap::ArgMatches, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = subargs.value_of(name).unwrap_or("");
    value.parse().map_err(|err: T::Err| ErrorKind::Msg(format!("bad --{}: {}", name, err)).into())
}

fn build_config(subargs: &clap::ArgMatches) -> Result<RenderConfig> {
    let max_scale = match subargs.value_of("max_scale") {
        Some(_) => Some(parse_arg(subargs, "max_scale")?),
        None => None,
    };
    Ok(RenderConfig {
        width: parse_arg(subargs, "width")?,
        height: parse_arg(subargs, "height")?,
        border_percent: parse_arg(subargs, "border")?,
        mode: parse_arg(subargs, "mode")?,
        scheme: parse_arg::<ColorScheme>(subargs, "scheme")?,
        classify_rule: parse_arg(subargs, "rule")?,
        polygon_strategy: parse_arg(subargs, "polygons")?,
        thing_marker: parse_arg(subargs, "marker")?,
        thick_lines: !subargs.is_present("thin"),
        draw_axis: subargs.is_present("axis"),
        draw_legend: subargs.is_present("legend"),
        draw_things: subargs.is_present("things"),
        max_scale,
    })
}

fn do_draw(args: &clap::ArgMatches, subargs: &clap::ArgMatches, filename: &str, wad: &automap::BareWAD) -> Result<()> {
    let config = build_config(subargs)?;
    let format: OutputFormat = parse_arg(subargs, "format")?;
    let outdir = PathBuf::from(subargs.value_of("outdir").unwrap_or("."));

    let pattern = subargs.value_of("pattern").unwrap_or("all");
    let names = wad.find_levels(pattern);
    if names.is_empty() {
        return Err(ErrorKind::UnknownLevel(pattern.to_owned()).into());
    }

    let stem = if filename == "-" {
        "stdin".to_owned()
    }
    else {
        Path::new(filename).file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "automap".to_owned())
    };

    let (outcomes, tally) = render_batch(
        wad, &names, &config, format,
        |name| output_path(&outdir, &stem, name, format),
        ScaleTally::new(),
    );

    if args.is_present("verbose") && tally.levels() > 1 {
        if let Some(average) = tally.average_units_per_pixel() {
            println!("Average scale: {:.3} units/pixel", average);
        }
    }

    let failed: Vec<_> = outcomes.iter()
        .filter(|outcome| outcome.result.is_err())
        .map(|outcome| outcome.name.as_str())
        .collect();
    if !failed.is_empty() {
        return Err(format!("couldn't draw {} of {} levels: {}", failed.len(), outcomes.len(), failed.join(", ")).into());
    }

    Ok(())
}

fn do_list(wad: &automap::BareWAD) {
    for (i, name) in wad.level_names().iter().enumerate() {
        println!("Map number {:2} name {}", i, name);
    }
}

fn do_info(wad: &automap::BareWAD) {
    println!("{:?}, {} lumps, directory at {}", wad.header.identification, wad.header.numlumps, wad.header.infotableofs);
    for map in wad.iter_maps() {
        println!("{} - {:?} format map", map.name, map.format);
    }
    for (i, entry) in wad.directory.iter().enumerate() {
        println!("{:5} {:>10} {:>8} {}", i, entry.filepos, entry.size, entry.name);
    }
}
