use crate::rules::Job;
use crate::simulation::random::RandomSource;

pub const UNKNOWN_PAST: &str = "{name}'s past is unknowable as mist.";

const FARMER: &[&str] = &[
    "{name} has worked the same furrows since childhood and can read the weather in the smell of the soil.",
    "{name} keeps a small plot of herbs beside the barley and trades them for a kind word.",
    "{name} once lost a whole harvest to blight and has never wasted a single grain since.",
    "{name} rises before dawn, hums to the oxen, and swears the crop grows better for it.",
    "{name} dreams of planting an orchard whose fruit strangers will one day eat.",
];

const WOODCUTTER: &[&str] = &[
    "{name} can fell a pine exactly where it is meant to fall and plants a sapling for every trunk taken.",
    "{name} carves small animals from offcuts and leaves them on doorsteps for the children.",
    "{name} knows every path through the forest, including a few nobody else remembers.",
    "{name} came to the village with nothing but an axe and a stubborn will.",
    "{name} says the old oaks whisper warnings before a storm.",
];

const MINER: &[&str] = &[
    "{name} has spent so long underground that sunlight still feels like a holiday.",
    "{name} keeps a lucky stone from the first seam ever struck and never works without it.",
    "{name} can tell good ore from poor by the ring it gives under the pick.",
    "{name} survived a collapse in the deep tunnels and now checks every beam twice.",
    "{name} sends a share of every find home to a family in the hills.",
];

const GUARD: &[&str] = &[
    "{name} walks the palisade every night and knows the sound of each loose plank.",
    "{name} once held the gate alone until help arrived and rarely speaks of it.",
    "{name} trains the young ones with wooden staves and endless patience.",
    "{name} took up the spear after bandits burned a neighbouring farm.",
    "{name} trusts no stranger at first sight, yet has never turned a hungry one away.",
];

const SCHOLAR: &[&str] = &[
    "{name} copies old texts by candlelight and fills the margins with questions.",
    "{name} charts the stars from the hilltop and predicts the first frost every year.",
    "{name} taught half the village to read, one winter evening at a time.",
    "{name} traded a good coat for a single book and considers it a bargain.",
    "{name} keeps careful records of every harvest in the hope of finding a pattern.",
];

const CHILD: &[&str] = &[
    "{name} chases geese through the square and is usually the one who gets chased back.",
    "{name} collects smooth river stones and names each one.",
    "{name} follows the elders around, asking why about everything.",
    "{name} has a loud laugh that carries across the whole village.",
    "{name} wants to grow up to be everything at once.",
];

const UNEMPLOYED: &[&str] = &[
    "{name} helps wherever hands are needed and waits for a trade to call.",
    "{name} tells the best stories at the tavern, most of them nearly true.",
    "{name} is still searching for a place in the village and a purpose in it.",
    "{name} mends nets, fences and quarrels with equal skill.",
    "{name} wanders the market each morning, learning a little of every craft.",
];

fn templates(job: Job) -> &'static [&'static str] {
    match job {
        Job::Farmer => FARMER,
        Job::Woodcutter => WOODCUTTER,
        Job::Miner => MINER,
        Job::Guard => GUARD,
        Job::Scholar => SCHOLAR,
        Job::Child => CHILD,
        Job::Unemployed => UNEMPLOYED,
    }
}

/// A template biography for a villager when no generator is configured.
pub fn fallback_bio(name: &str, job: Job, rng: &mut impl RandomSource) -> String {
    let options = templates(job);
    options[rng.index(options.len())].replace("{name}", name)
}

/// Shown for a villager who has no biography yet.
pub fn unknown_past(name: &str) -> String {
    UNKNOWN_PAST.replace("{name}", name)
}
