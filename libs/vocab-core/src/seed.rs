//! Built-in starter deck used by autofill.

use crate::types::PartOfSpeech;

const NOUNS: &[(&str, &str)] = &[
    ("apple", "苹果"),
    ("book", "书"),
    ("cat", "猫"),
    ("dog", "狗"),
    ("egg", "鸡蛋"),
    ("fish", "鱼"),
    ("garden", "花园"),
    ("house", "房子"),
    ("island", "岛"),
    ("juice", "果汁"),
    ("kite", "风筝"),
    ("lemon", "柠檬"),
    ("milk", "牛奶"),
    ("nose", "鼻子"),
    ("orange", "橙子"),
    ("pencil", "铅笔"),
    ("queen", "女王"),
    ("rabbit", "兔子"),
    ("school", "学校"),
    ("tiger", "老虎"),
    ("umbrella", "雨伞"),
    ("violin", "小提琴"),
    ("window", "窗户"),
    ("zebra", "斑马"),
    ("bird", "鸟"),
    ("river", "河"),
    ("tree", "树"),
    ("teacher", "老师"),
];

const VERBS: &[(&str, &str)] = &[
    ("run", "跑"),
    ("jump", "跳"),
    ("swim", "游泳"),
    ("read", "读"),
    ("write", "写"),
    ("sing", "唱歌"),
    ("dance", "跳舞"),
    ("eat", "吃"),
    ("drink", "喝"),
    ("sleep", "睡觉"),
    ("walk", "走"),
    ("play", "玩"),
    ("draw", "画"),
    ("cook", "做饭"),
    ("climb", "爬"),
    ("listen", "听"),
    ("speak", "说"),
    ("open", "打开"),
    ("close", "关上"),
    ("help", "帮助"),
    ("watch", "观看"),
    ("throw", "扔"),
    ("catch", "接住"),
    ("build", "建造"),
    ("fly", "飞"),
    ("laugh", "笑"),
    ("think", "想"),
    ("wash", "洗"),
];

const ADJECTIVES: &[(&str, &str)] = &[
    ("big", "大的"),
    ("small", "小的"),
    ("happy", "快乐的"),
    ("sad", "难过的"),
    ("hot", "热的"),
    ("cold", "冷的"),
    ("fast", "快的"),
    ("slow", "慢的"),
    ("tall", "高的"),
    ("short", "矮的"),
    ("red", "红色的"),
    ("blue", "蓝色的"),
    ("new", "新的"),
    ("old", "旧的"),
    ("clean", "干净的"),
    ("dirty", "脏的"),
    ("kind", "善良的"),
    ("brave", "勇敢的"),
    ("quiet", "安静的"),
    ("loud", "吵闹的"),
    ("sweet", "甜的"),
    ("soft", "软的"),
    ("hard", "硬的"),
    ("funny", "有趣的"),
    ("busy", "忙碌的"),
];

const ADVERBS: &[(&str, &str)] = &[
    ("quickly", "快速地"),
    ("slowly", "慢慢地"),
    ("happily", "高兴地"),
    ("quietly", "安静地"),
    ("loudly", "大声地"),
    ("carefully", "小心地"),
    ("always", "总是"),
    ("never", "从不"),
    ("often", "经常"),
    ("sometimes", "有时"),
    ("today", "今天"),
    ("tomorrow", "明天"),
    ("here", "这里"),
    ("there", "那里"),
    ("very", "非常"),
    ("soon", "很快"),
    ("again", "再一次"),
    ("together", "一起"),
    ("early", "早地"),
    ("late", "晚地"),
    ("well", "好地"),
    ("gently", "轻轻地"),
    ("bravely", "勇敢地"),
    ("kindly", "友善地"),
];

/// Seed entries for a part of speech, as `(word, meaning)` pairs.
pub fn seed_words(pos: PartOfSpeech) -> &'static [(&'static str, &'static str)] {
    match pos {
        PartOfSpeech::Noun => NOUNS,
        PartOfSpeech::Verb => VERBS,
        PartOfSpeech::Adjective => ADJECTIVES,
        PartOfSpeech::Adverb => ADVERBS,
        PartOfSpeech::Other => &[],
    }
}
