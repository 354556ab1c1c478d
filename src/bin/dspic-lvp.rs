#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate dspic_lvp;
use dspic_lvp::*;

use std::path::Path;
use std::process::exit;

use dspic_lvp::lvp::Programmer;

fn get_param_or<T>(matches: &clap::ArgMatches, name: &str, default: T) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(default),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn parse_address(text: &str) -> AResult<u32> {
	let address = if text.starts_with("0x") || text.starts_with("0X") {
		u32::from_str_radix(&text[2..], 16)
	} else {
		text.parse::<u32>()
	};
	match address {
		Ok(a) if a <= 0xff_ffff => Ok(a),
		Ok(a) => bail!("address 0x{:x} exceeds 24 bits", a),
		Err(e) => bail!("invalid address {:?}: {}", text, e),
	}
}

fn open_programmer(matches: &clap::ArgMatches) -> AResult<Programmer<gpio::SysfsHardware>> {
	let defaults = gpio::Pins::default();
	let pins = gpio::Pins {
		clock: get_param_or(matches, "clock", defaults.clock)?,
		data: get_param_or(matches, "data", defaults.data)?,
		reset: get_param_or(matches, "reset", defaults.reset)?,
	};
	let root = Path::new(matches.value_of("gpio_root").unwrap_or(gpio::DEFAULT_ROOT));
	let hardware = gpio::open_gpio(root, pins)?;
	Ok(Programmer::new(hardware, lvp::DSPIC33EP128GS706))
}

fn info(matches: &clap::ArgMatches) -> AResult<()> {
	let mut programmer = open_programmer(matches)?;
	let info = programmer.read_info();
	println!("{}", info);
	Ok(())
}

fn erase(matches: &clap::ArgMatches) -> AResult<()> {
	let mut programmer = open_programmer(matches)?;
	programmer.bulk_erase();
	programmer.exit();
	Ok(())
}

fn flash(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let file = match sub_m.value_of("FILE") {
		Some(f) => f,
		None => bail!("missing parameter FILE"),
	};
	let chunks = image::read_ihex(file)?;
	let bytes: usize = chunks.iter().map(|c| c.data.len()).sum();

	let mut programmer = open_programmer(matches)?;
	for chunk in &chunks {
		programmer.write(chunk.address, &chunk.data);
	}
	programmer.finalize();
	info!("Programmed {} bytes from {}", bytes, file);
	Ok(())
}

fn read(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = match sub_m.value_of("ADDRESS") {
		Some(a) => parse_address(a)?,
		None => bail!("missing parameter ADDRESS"),
	};

	let mut programmer = open_programmer(matches)?;
	let word = programmer.read_word(address);
	programmer.exit();
	println!("@{:06x}: {:04x}", address, word);
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg clock: --clock +takes_value "GPIO number of the PGC line (default 2)")
		(@arg data: --data +takes_value "GPIO number of the PGD line (default 3)")
		(@arg reset: --reset +takes_value "GPIO number of the nMCLR line (default 4)")
		(@arg gpio_root: --("gpio-root") +takes_value "sysfs GPIO directory (default /sys/class/gpio)")
		(@arg no_realtime: --("no-realtime") "don't switch to realtime scheduling")
		(@subcommand info =>
			(about: "show device and revision ID, configuration and unique ID")
		)
		(@subcommand erase =>
			(about: "bulk erase user flash")
		)
		(@subcommand flash =>
			(about: "erase and program an Intel HEX image")
			(@arg FILE: +required "image to program")
		)
		(@subcommand read =>
			(about: "read a single program memory word")
			(@arg ADDRESS: +required "24-bit address (decimal or 0x-prefixed hex)")
		)
	).get_matches();

	// keep until the lines are released
	let _realtime = if matches.is_present("no_realtime") {
		None
	} else {
		match realtime::RealtimeGuard::acquire() {
			Ok(guard) => Some(guard),
			Err(e) => {
				warn!("Couldn't switch to realtime scheduling, timing may be off: {}", e);
				None
			},
		}
	};

	match matches.subcommand() {
		("info", _) => {
			info(&matches)
		},
		("erase", _) => {
			erase(&matches)
		},
		("flash", Some(sub_m)) => {
			flash(&matches, sub_m)
		},
		("read", Some(sub_m)) => {
			read(&matches, sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
