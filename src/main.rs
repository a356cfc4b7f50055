use std::{fs::{self, File}, io, path::{Path, PathBuf}, process, time::Instant};

use clap::{ArgGroup, Parser};
use log::info;

use huffarc::{
    archive::{Decoder, Encoder},
    bitstreams::{BitReader, BitWriter},
    Properties, Result,
};

const FAILURE_EXIT_CODE: i32 = 111;

#[derive(Parser, Debug)]
#[command(name = "huffarc", about = "Pack files into a canonical-Huffman archive and back")]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "decompress", "list"])))]
struct Args {
    /// Compress the files into the archive
    #[arg(short, long, num_args = 2.., value_names = ["ARCHIVE", "FILE"])]
    compress: Option<Vec<PathBuf>>,
    /// Extract every file of the archive
    #[arg(short, long, value_name = "ARCHIVE")]
    decompress: Option<PathBuf>,
    /// Print the names and sizes stored in the archive as JSON
    #[arg(short, long, value_name = "ARCHIVE")]
    list: Option<PathBuf>,
    /// Directory receiving extracted files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Properties file with `buffersize` and `outputdir`
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Bit stream buffer capacity in bytes
    #[arg(long)]
    buffer_size: Option<usize>,
    /// Print per-file block statistics as JSON after compressing
    #[arg(long)]
    stats: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("huffarc: {}", e);
        process::exit(FAILURE_EXIT_CODE);
    }
}

fn run(args: Args) -> Result<()> {
    let mut props = match &args.config {
        Some(path) => Properties::from_file(path)?,
        None => Properties::default(),
    };
    if let Some(buffer_size) = args.buffer_size {
        props.set_buffer_size(buffer_size)?;
    }
    if let Some(output_dir) = args.output_dir {
        props.output_dir = output_dir;
    }

    if let Some(paths) = &args.compress {
        // clap guarantees at least the archive and one input
        let (archive, inputs) = paths.split_at(1);
        compress(&archive[0], inputs, &props, args.stats)
    } else if let Some(archive) = &args.decompress {
        decompress(archive, &props)
    } else if let Some(archive) = &args.list {
        list(archive, &props)
    } else {
        Ok(())
    }
}

fn stored_name(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{} does not name a file", path.display())))
}

fn compress(archive: &Path, inputs: &[PathBuf], props: &Properties, stats: bool) -> Result<()> {
    let comp_time = Instant::now();

    let mut encoder = Encoder::new(BitWriter::with_capacity(File::create(archive)?, props.buffer_size));
    let mut all_stats = Vec::with_capacity(inputs.len());

    for (i, path) in inputs.iter().enumerate() {
        let name = stored_name(path)?;
        let mut input = BitReader::with_capacity(File::open(path)?, props.buffer_size);
        all_stats.push(encoder.encode_file(&name, &mut input, i + 1 == inputs.len())?);
    }

    encoder.into_inner().sync_all()?;

    info!(
        "compressed {} files into {} in {}ms",
        inputs.len(),
        archive.display(),
        comp_time.elapsed().as_millis()
    );

    if stats {
        println!("{}", serde_json::to_string_pretty(&all_stats).map_err(io::Error::from)?);
    }

    Ok(())
}

fn decompress(archive: &Path, props: &Properties) -> Result<()> {
    let decomp_time = Instant::now();

    fs::create_dir_all(&props.output_dir)?;
    let mut decoder = Decoder::new(BitReader::with_capacity(File::open(archive)?, props.buffer_size));
    let entries = decoder.decode_to_directory(&props.output_dir)?;

    info!(
        "extracted {} files into {} in {}ms",
        entries.len(),
        props.output_dir.display(),
        decomp_time.elapsed().as_millis()
    );

    Ok(())
}

fn list(archive: &Path, props: &Properties) -> Result<()> {
    let mut decoder = Decoder::new(BitReader::with_capacity(File::open(archive)?, props.buffer_size));
    let entries = decoder.list()?;

    println!("{}", serde_json::to_string_pretty(&entries).map_err(io::Error::from)?);

    Ok(())
}
