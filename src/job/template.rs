/// Generate a template .splice.toml.
///
/// The template ships the rule sets that strip the disappearing-messages
/// feature from the chat pages of a React frontend, so it doubles as a worked
/// example of each match specification.
pub fn generate_init_template() -> String {
	INIT_TEMPLATE.to_string()
}

const INIT_TEMPLATE: &str = r##"# splice configuration
#
# Run `splice` with no arguments to apply every [[jobs]] entry in order, or
# `splice --ruleset <id> <path>...` to apply one rule set to other files.
# Rules run top to bottom; each rule sees the output of the previous one.
#
# A rule sets exactly one match specification:
#   pattern = '<regex>'            (add dot_all = true to let `.` cross lines)
#   literal = "<exact text>"
#   begin = "<text>", end = "<text>"   (shortest span from begin through end)
# and a `replacement` (empty deletes the match).

# Stop looking for .splice.toml in parent directories
root = true

# Skip ~/.splice.toml when this env var is truthy
root-config-lookup-disable-env-var = "CI"

[rulesets.friend-chat]
description = "Remove disappearing messages from FriendChatPage.jsx"

[[rulesets.friend-chat.rules]]
description = "state declarations"
pattern = '  // ✅ Disappearing messages state\n  const \[disappearingEnabled.*?\n  const \[disappearingDuration.*?\n'
dot_all = true
replacement = "  // REMOVED: Disappearing messages - replaced with 6-day auto-delete\n"

[[rulesets.friend-chat.rules]]
description = "timer ref"
literal = "  const disappearingTimerRef = useRef(null);\n"

[[rulesets.friend-chat.rules]]
description = "timer effect"
begin = "  // ✅ CRITICAL: Real-time disappearing messages"
end = "}, [disappearingEnabled, disappearingDuration]);"
replacement = "  // REMOVED: Disappearing message timer - replaced with 6-day auto-delete"

[[rulesets.friend-chat.rules]]
description = "setters in fetchChatMeta"
pattern = '        setDisappearing.*?\(metaData\.meta\?\.disappearing.*?\);?\n        setDisappearing.*?\(metaData\.meta\?\.disappearingDuration.*?\);?\n'

[[rulesets.friend-chat.rules]]
description = "toggle handler"
begin = "  // ✅ Disappearing messages toggle\n  const handleDisappearingMessages = async"
end = "  };"

[[rulesets.friend-chat.rules]]
description = "timer cleanup"
literal = "      if (disappearingTimerRef.current) {\n        clearInterval(disappearingTimerRef.current);\n      }\n"

[rulesets.group-chat]
description = "Remove disappearing messages from GroupChatPage.jsx"

[[rulesets.group-chat.rules]]
description = "state declarations"
pattern = '  const \[disappearingDuration.*?\n  const \[showDisappearing.*?\n  const \[disappearingMessagesToRemove.*?\n'
dot_all = true
replacement = "  // REMOVED: Disappearing messages - replaced with 6-day auto-delete\n"

[[rulesets.group-chat.rules]]
description = "timer ref"
literal = "  const disappearingTimerRef = useRef(null);\n"

[[rulesets.group-chat.rules]]
description = "socket handler"
begin = "    const handleDisappearingUpdated = "
end = "};"

[[rulesets.group-chat.rules]]
description = "socket listener registration"
literal = "      \"group_disappearing_updated\",\n      handleDisappearingUpdated\n"

[[rulesets.group-chat.rules]]
description = "timer effect"
pattern = '  // Disappearing messages timer\n  useEffect\(\(\) => \{.*?\}, \[disappearingDuration.*?\]\);'
dot_all = true
replacement = "  // REMOVED: Disappearing message timer - replaced with 6-day auto-delete"

[[rulesets.group-chat.rules]]
description = "timer cleanup"
literal = "      if (disappearingTimerRef.current) {\n        clearInterval(disappearingTimerRef.current);\n      }\n"

[[jobs]]
path = "frontend/src/pages/FriendChatPage.jsx"
ruleset = "friend-chat"

[[jobs]]
path = "frontend/src/pages/GroupChatPage.jsx"
ruleset = "group-chat"
"##;
