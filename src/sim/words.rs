//! Word sources for word and story modes

/// Word mode draws uniformly from this list
pub const WORD_LIST: &[&str] = &[
    "CAT", "DOG", "SUN", "MOON", "STAR", "TREE", "FISH", "BIRD", "RAIN", "SNOW",
    "WIND", "FIRE", "LAKE", "ROCK", "SAND", "LEAF", "WAVE", "CLOUD", "RIVER", "STONE",
    "FLASH", "SPEED", "TYPE", "KEYS", "QUICK", "BRAVE", "LIGHT", "DREAM", "SHIFT", "SPACE",
    "PLANET", "ROCKET", "ORBIT", "COMET", "GALAXY", "FALCON", "JUNGLE", "PUZZLE", "RHYTHM", "SILVER",
    "GARDEN", "WINTER", "SUMMER", "BRIDGE", "CASTLE", "DRAGON", "KNIGHT", "WIZARD", "POTION", "SHIELD",
];

/// Story mode walks this passage word by word, wrapping at the end
pub const STORY: &str = "ONCE UPON A TIME A SMALL FOX LIVED AT THE EDGE OF A QUIET FOREST \
    EVERY MORNING THE FOX WALKED TO THE RIVER TO WATCH THE FISH JUMP \
    ONE DAY A STORM ROLLED OVER THE HILLS AND THE RIVER GREW WILD \
    THE FOX WAITED UNDER AN OLD OAK UNTIL THE SUN RETURNED \
    WHEN THE SKY CLEARED THE FOREST SANG AND THE FOX WENT HOME";

/// Story passage split into words
pub fn story_words() -> impl Iterator<Item = &'static str> {
    STORY.split_whitespace()
}

/// Word at `cursor` in the story, wrapping around
pub fn story_word(cursor: usize) -> &'static str {
    let count = story_words().count();
    story_words().nth(cursor % count).unwrap_or("FOX")
}
